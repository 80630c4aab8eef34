//! Entry point: configure logging, load settings, and run the check loop.
//!
//! ## Usage
//!
//! ```sh
//! DISCORD_TOKEN=... CHANNEL_ID=... openai_news_bot --check-interval-minutes 30
//! ```

use clap::Parser;
use openai_news_bot::announce::{Announcer, DiscordAnnouncer, LogAnnouncer};
use openai_news_bot::cli::Cli;
use openai_news_bot::config::load_config;
use openai_news_bot::scheduler::run_scheduled;
use openai_news_bot::{NewsBot, NewsMonitor, PostedNewsStore};
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is normal in production.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file"),
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let args = Cli::parse();
    debug!(?args.storage_file, ?args.config, args.check_interval_minutes, "Parsed CLI arguments");

    let config = load_config(args.config.as_deref()).await?;
    let monitor = NewsMonitor::new(&config)?;
    let store = PostedNewsStore::new(&args.storage_file);
    let mut bot = NewsBot::new(monitor, store).with_announce_delay(args.announce_delay());

    if args.dry_run {
        info!("Dry run: news items will be logged, not posted");
        run(&mut bot, &LogAnnouncer, &args).await;
    } else {
        // clap enforces both when --dry-run is absent
        let (Some(token), Some(channel_id)) = (args.discord_token.clone(), args.channel_id.clone()) else {
            return Err("DISCORD_TOKEN and CHANNEL_ID are required".into());
        };
        let announcer = DiscordAnnouncer::new(token, channel_id);
        run(&mut bot, &announcer, &args).await;
    }

    Ok(())
}

async fn run<A: Announcer>(bot: &mut NewsBot, announcer: &A, args: &Cli) {
    if args.once {
        let report = bot.run_cycle(announcer).await;
        info!(collected = report.collected, announced = report.announced, "Single check complete");
        return;
    }

    info!(
        interval_minutes = args.check_interval_minutes,
        "Bot started! Checking for news every {} minutes", args.check_interval_minutes
    );
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    };
    run_scheduled(bot, announcer, args.check_interval(), shutdown).await;
}
