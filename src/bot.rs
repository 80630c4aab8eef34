//! One announcement cycle: collect, announce what is new, remember it.
//!
//! [`NewsBot`] owns the announced-URL set for the lifetime of the process.
//! It is loaded once when the bot is built, mutated as items are
//! announced, and flushed to the store after any cycle that announced at
//! least one item. After each flush it is cut back to the same newest
//! entries the store keeps on disk.

use crate::announce::Announcer;
use crate::monitor::NewsMonitor;
use crate::store::{AnnouncedSet, PostedNewsStore};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Pause between consecutive announcements.
pub const DEFAULT_ANNOUNCE_DELAY: Duration = Duration::from_secs(1);

/// Outcome of a single cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Relevant records returned by the monitor.
    pub collected: usize,
    /// Records announced during this cycle.
    pub announced: usize,
    /// Whether announcing stopped early because the chat backend failed.
    pub interrupted: bool,
}

#[derive(Debug)]
pub struct NewsBot {
    monitor: NewsMonitor,
    store: PostedNewsStore,
    posted: AnnouncedSet,
    announce_delay: Duration,
}

impl NewsBot {
    /// Build the bot and load the announced set from `store`.
    pub fn new(monitor: NewsMonitor, store: PostedNewsStore) -> Self {
        let posted = store.load();
        Self {
            monitor,
            store,
            posted,
            announce_delay: DEFAULT_ANNOUNCE_DELAY,
        }
    }

    pub fn with_announce_delay(mut self, delay: Duration) -> Self {
        self.announce_delay = delay;
        self
    }

    pub fn posted(&self) -> &AnnouncedSet {
        &self.posted
    }

    /// Run one collection cycle against `announcer`.
    ///
    /// Records are announced in ranked order, newest first, skipping any URL
    /// already in the announced set. A chat failure stops the rest of this
    /// cycle's announcements; what was sent before it is still persisted.
    #[instrument(level = "info", skip_all)]
    pub async fn run_cycle<A: Announcer>(&mut self, announcer: &A) -> CycleReport {
        let mut report = CycleReport::default();

        if let Err(e) = announcer.prepare().await {
            error!(error = %e, "Announcement target unavailable; skipping cycle");
            report.interrupted = true;
            return report;
        }

        let items = self.monitor.collect().await;
        report.collected = items.len();

        for item in &items {
            if self.posted.contains(&item.url) {
                continue;
            }
            if report.announced > 0 && !self.announce_delay.is_zero() {
                sleep(self.announce_delay).await;
            }
            if let Err(e) = announcer.announce(item).await {
                warn!(url = %item.url, error = %e, "Failed to post news item; stopping this cycle");
                report.interrupted = true;
                break;
            }
            self.posted.insert(item.url.clone());
            report.announced += 1;
        }

        if report.announced > 0 {
            self.store.save(&self.posted);
            self.forget_oldest();
            info!(count = report.announced, "Posted new news items");
        } else {
            info!("No new news items found");
        }
        report
    }

    fn forget_oldest(&mut self) {
        let excess = self.posted.len().saturating_sub(self.store.capacity());
        if excess > 0 {
            self.posted.drain(..excess);
            debug!(dropped = excess, kept = self.posted.len(), "Trimmed announced set");
        }
    }
}
