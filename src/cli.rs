//! Command-line interface definitions for the OpenAI news bot.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also come from the environment (or a `.env` file).

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the OpenAI news bot.
///
/// # Examples
///
/// ```sh
/// # Post to a channel every 30 minutes
/// DISCORD_TOKEN=... CHANNEL_ID=123 openai_news_bot
///
/// # One pass, log instead of posting
/// openai_news_bot --once --dry-run
///
/// # Custom sources and keywords
/// openai_news_bot -c news.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true, required_unless_present = "dry_run")]
    pub discord_token: Option<String>,

    /// Discord channel to post announcements to
    #[arg(long, env = "CHANNEL_ID", required_unless_present = "dry_run")]
    pub channel_id: Option<String>,

    /// Minutes between checks
    #[arg(
        long,
        env = "CHECK_INTERVAL_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub check_interval_minutes: u64,

    /// JSON file holding the URLs already announced
    #[arg(long, env = "POSTED_NEWS_FILE", default_value = "posted_news.json")]
    pub storage_file: PathBuf,

    /// Optional YAML file replacing the built-in sources and keywords
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Log new items instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Milliseconds to wait between consecutive announcements
    #[arg(long, default_value_t = 1000)]
    pub announce_delay_ms: u64,
}

impl Cli {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }
}
