//! Periodic re-invocation of the announcement cycle.
//!
//! The first cycle runs immediately. Later cycles follow a fixed interval;
//! ticks missed while a slow cycle was running are skipped rather than
//! replayed, so cycles never overlap or burst.

use crate::announce::Announcer;
use crate::bot::NewsBot;
use std::future::Future;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Run cycles every `period` until `shutdown` resolves.
///
/// Shutdown is only observed between cycles; a running cycle always completes.
pub async fn run_scheduled<A, F>(bot: &mut NewsBot, announcer: &A, period: Duration, shutdown: F)
where
    A: Announcer,
    F: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested; stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                info!("Checking for new OpenAI news");
                let report = bot.run_cycle(announcer).await;
                info!(
                    collected = report.collected,
                    announced = report.announced,
                    next_in_secs = period.as_secs(),
                    "Cycle finished"
                );
            }
        }
    }
}
