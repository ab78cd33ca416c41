use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::models::timeline::{ResolutionStats, Timeline};
use crate::traits::{
    data_provider::ExplorerApi,
    detail_cache::DetailCache,
    event_handler::TimelineSink,
};

use super::calibrator::{self, Calibrator};
use super::fetcher::TransactionFetcher;
use super::reconstructor::{build_records, reconstruct};

/// Drives one run: collect hashes, resolve details, reconstruct, calibrate
pub struct TimelineTracker {
    address: String,
    api: Arc<dyn ExplorerApi>,
    fetcher: TransactionFetcher,
    config: TimelineConfig,
    sinks: Vec<Arc<dyn TimelineSink>>,
}

impl TimelineTracker {
    /// Create a new timeline tracker
    pub fn new(
        address: impl Into<String>,
        api: Arc<dyn ExplorerApi>,
        cache: Arc<dyn DetailCache>,
        config: TimelineConfig,
    ) -> Self {
        Self {
            address: address.into(),
            fetcher: TransactionFetcher::new(Arc::clone(&api), cache, config.clone()),
            api,
            config,
            sinks: Vec::new(),
        }
    }

    /// Add an export sink
    pub fn add_sink(&mut self, sink: Arc<dyn TimelineSink>) {
        self.sinks.push(sink);
    }

    /// Build the timeline without exporting it
    pub async fn build(&self) -> Result<Timeline> {
        self.config.validate()?;
        info!("Fetching transaction list for {}", self.address);

        let collected = self.fetcher.collect_hashes(&self.address).await?;
        info!(
            "Collected {} unique hashes from {} pages",
            collected.hashes.len(),
            collected.pages
        );

        let details = self.fetcher.resolve_details(&collected.hashes).await;
        let set = build_records(&self.address, &collected.hashes, &details);

        let stats = ResolutionStats {
            pages: collected.pages,
            listed_items: collected.listed_items,
            unique_hashes: collected.hashes.len(),
            duplicate_hashes: collected.duplicates,
            cache_hits: set.cache_hits,
            fetched: set.fetched,
            dropped: set.rejected.len(),
            failed_hashes: set.failed_hashes,
            page_cap_reached: collected.page_cap_reached,
        };
        self.check_failure_rate(&stats)?;

        if stats.dropped > 0 {
            info!("Dropped {} unconfirmed or unusable transactions", stats.dropped);
        }
        for hash in &stats.failed_hashes {
            warn!("Could not resolve {}", hash);
        }
        info!("Records with block height: {}", set.records.len());

        let series = reconstruct(set.records)?;
        // nothing to anchor when the history is empty
        let (points, calibration) = if self.config.calibrate && !series.is_empty() {
            Calibrator::new(
                self.api.as_ref(),
                self.config.balance_retry,
                self.config.calibration_policy,
            )
            .calibrate(&self.address, series)
            .await?
        } else {
            calibrator::skip(series)
        };

        Ok(Timeline {
            address: self.address.clone(),
            points,
            calibration,
            stats,
        })
    }

    /// Build the timeline and hand it to every sink. An empty timeline is
    /// returned without exporting.
    pub async fn run(&self) -> anyhow::Result<Timeline> {
        let timeline = self.build().await?;
        if timeline.is_empty() {
            info!("No usable records for {}", self.address);
            return Ok(timeline);
        }
        for sink in &self.sinks {
            sink.export(&timeline)
                .await
                .with_context(|| format!("export to {} failed", sink.name()))?;
        }
        Ok(timeline)
    }

    fn check_failure_rate(&self, stats: &ResolutionStats) -> Result<()> {
        let total = stats.unique_hashes;
        let failed = stats.failed();
        if total == 0 || failed == 0 {
            return Ok(());
        }
        let ratio = failed as f64 / total as f64;
        if ratio > self.config.max_failure_ratio {
            return Err(TimelineError::ResolutionFailureRate {
                failed,
                total,
                max_ratio: self.config.max_failure_ratio,
            });
        }
        Ok(())
    }
}
