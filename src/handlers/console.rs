use async_trait::async_trait;
use tracing::info;

use crate::traits::event_handler::TimelineSink;
use crate::models::timeline::{CalibrationOutcome, Timeline};
use crate::utils::helper::{format_address, iso_utc};

/// Logs a run summary
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a new console sink
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimelineSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()> {
        let stats = &timeline.stats;

        info!("{}", "=".repeat(80));
        info!("BALANCE TIMELINE");
        info!("{}", "=".repeat(80));
        info!("Address: {}", format_address(&timeline.address));
        info!(
            "Pages: {} • Listed: {} • Unique: {} • Duplicates: {}",
            stats.pages, stats.listed_items, stats.unique_hashes, stats.duplicate_hashes
        );
        info!(
            "Cache hits: {} • Fetched: {} • Dropped: {} • Failed: {}",
            stats.cache_hits,
            stats.fetched,
            stats.dropped,
            stats.failed()
        );
        if stats.page_cap_reached {
            info!("Page cap reached - older history was not fetched");
        }
        info!("{}", "-".repeat(80));

        if let (Some(first), Some(last)) = (timeline.points.first(), timeline.points.last()) {
            info!("Points: {}", timeline.len());
            info!("First: block {} at {}", first.block_height, iso_utc(&first.timestamp));
            info!("Last:  block {} at {}", last.block_height, iso_utc(&last.timestamp));
            info!("➤ Final balance: {}", last.running_balance);
        }

        match &timeline.calibration {
            CalibrationOutcome::Applied { live_balance, offset } => {
                info!("Calibrated to current balance {} (offset {:+})", live_balance, offset);
            }
            CalibrationOutcome::Skipped => {
                info!("Not calibrated - curve starts at 0");
            }
            CalibrationOutcome::Unavailable { reason } => {
                info!("Calibration unavailable ({}) - curve starts at 0", reason);
            }
        }
        info!("{}", "=".repeat(80));
        Ok(())
    }
}
