//! Delivery of new articles to a chat channel.
//!
//! # Architecture
//!
//! - [`Announcer`]: what the announcement cycle needs from a chat backend
//! - [`DiscordAnnouncer`]: posts one embed per article through the Discord REST API
//! - [`LogAnnouncer`]: logs instead of sending, for `--dry-run`
//!
//! # Embed Layout
//!
//! | Field | Value |
//! |-------|-------|
//! | title | article title (cut to 256 characters) |
//! | url | article URL |
//! | description | teaser, or [`DEFAULT_DESCRIPTION`] when empty |
//! | color | [`BRAND_COLOR`] |
//! | timestamp | `published_at`, RFC 3339 |
//! | footer | [`FOOTER_TEXT`] |
//! | image | only when the article carries one |

use crate::models::ArticleRecord;
use crate::utils::{truncate_chars, truncate_for_log};
use chrono::SecondsFormat;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const BRAND_COLOR: u32 = 0x10a37f;
pub const FOOTER_TEXT: &str = "OpenAI News";
pub const DEFAULT_DESCRIPTION: &str = "New update from OpenAI";
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const EMBED_TITLE_MAX_CHARS: usize = 256;

#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("channel {0} not found")]
    ChannelNotFound(String),
    #[error("chat API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// A chat backend able to publish articles.
#[allow(async_fn_in_trait)]
pub trait Announcer {
    /// Check the target is reachable before a cycle starts announcing.
    async fn prepare(&self) -> Result<(), AnnounceError> {
        Ok(())
    }

    /// Publish one article.
    async fn announce(&self, record: &ArticleRecord) -> Result<(), AnnounceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

/// A Discord rich embed for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub footer: EmbedFooter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

impl From<&ArticleRecord> for Embed {
    fn from(record: &ArticleRecord) -> Self {
        let description = if record.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            record.description.clone()
        };
        Self {
            title: truncate_chars(&record.title, EMBED_TITLE_MAX_CHARS),
            url: record.url.clone(),
            description,
            color: BRAND_COLOR,
            timestamp: record.published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            footer: EmbedFooter {
                text: FOOTER_TEXT.to_string(),
            },
            image: record.image.clone().map(|url| EmbedImage { url }),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateMessage {
    embeds: Vec<Embed>,
}

/// Posts articles to one Discord channel as the bot user.
#[derive(Clone)]
pub struct DiscordAnnouncer {
    client: Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl std::fmt::Debug for DiscordAnnouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordAnnouncer")
            .field("api_base", &self.api_base)
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

impl DiscordAnnouncer {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DISCORD_API_BASE.to_string(),
            token: token.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Point the announcer at a different API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn channel_url(&self) -> String {
        format!("{}/channels/{}", self.api_base, self.channel_id)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn check_status(rsp: reqwest::Response) -> Result<reqwest::Response, AnnounceError> {
        let status = rsp.status();
        if status.is_success() {
            return Ok(rsp);
        }
        let body = rsp.text().await.unwrap_or_default();
        Err(AnnounceError::Status {
            status,
            body: truncate_for_log(&body, 300),
        })
    }
}

impl Announcer for DiscordAnnouncer {
    #[instrument(level = "info", skip_all, fields(channel_id = %self.channel_id))]
    async fn prepare(&self) -> Result<(), AnnounceError> {
        let rsp = self
            .client
            .get(self.channel_url())
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;
        if rsp.status() == StatusCode::NOT_FOUND {
            return Err(AnnounceError::ChannelNotFound(self.channel_id.clone()));
        }
        Self::check_status(rsp).await?;
        debug!("Channel reachable");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(url = %record.url))]
    async fn announce(&self, record: &ArticleRecord) -> Result<(), AnnounceError> {
        let payload = CreateMessage {
            embeds: vec![Embed::from(record)],
        };
        let rsp = self
            .client
            .post(format!("{}/messages", self.channel_url()))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await?;
        if let Err(e) = Self::check_status(rsp).await {
            warn!(error = %e, "Discord rejected message");
            return Err(e);
        }
        info!(title = %record.title, "Posted news item");
        Ok(())
    }
}

/// Logs articles instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    async fn announce(&self, record: &ArticleRecord) -> Result<(), AnnounceError> {
        info!(
            title = %record.title,
            url = %record.url,
            source = %record.source_name,
            published_at = %record.published_at,
            "Would post news item"
        );
        Ok(())
    }
}
