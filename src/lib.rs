//! # OpenAI News Bot
//!
//! Watches the OpenAI blog and research listings, keeps the posts that look
//! like product or model announcements, and posts the ones it has not seen
//! before to a Discord channel.
//!
//! ## Architecture
//!
//! Each cycle follows the same pipeline:
//! 1. **Fetching**: download every configured listing page, one at a time ([`monitor`])
//! 2. **Extraction**: pull article records out of the markup with a selector chain ([`extract`])
//! 3. **Ranking**: keep relevant records, newest first, at most ten ([`relevance`])
//! 4. **Announcing**: post records whose URL is not yet in the announced set ([`bot`], [`announce`])
//! 5. **Persistence**: write the announced set back to disk ([`store`])
//!
//! [`scheduler`] repeats the cycle on a fixed interval.

pub mod announce;
pub mod bot;
pub mod cli;
pub mod config;
pub mod dates;
pub mod extract;
pub mod models;
pub mod monitor;
pub mod relevance;
pub mod scheduler;
pub mod store;
pub mod utils;

pub use announce::{Announcer, DiscordAnnouncer, LogAnnouncer};
pub use bot::{CycleReport, NewsBot};
pub use config::MonitorConfig;
pub use models::{ArticleRecord, PageLayout, SourceDescriptor};
pub use monitor::NewsMonitor;
pub use store::{AnnouncedSet, PostedNewsStore};
