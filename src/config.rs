use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::providers::explorer_api::{ApiTimeouts, DEFAULT_BASE_URL};
use crate::utils::retry::RetryPolicy;

/// What to do when the live balance cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationPolicy {
    /// Keep the relative series and report the failure
    #[default]
    Fallback,
    /// Fail the run
    Fail,
}

/// Options recognised by the timeline pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub base_url: String,
    /// Items requested per list page
    pub page_size: usize,
    /// Pause between list pages
    pub page_delay_ms: u64,
    /// Stop after this many pages; 0 means no cap
    pub max_pages: usize,
    /// Detail lookups in flight at once
    pub concurrency: usize,
    /// `None` keeps the cache in memory for this run only
    pub cache_dir: Option<PathBuf>,
    /// Ignore cached details (entries are still rewritten)
    pub force_refresh: bool,
    pub calibrate: bool,
    pub calibration_policy: CalibrationPolicy,
    /// Fail the run if more than this share of hashes cannot be resolved
    pub max_failure_ratio: f64,
    pub page_retry: RetryPolicy,
    pub detail_retry: RetryPolicy,
    pub balance_retry: RetryPolicy,
    pub timeouts: ApiTimeouts,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 100,
            page_delay_ms: 250,
            max_pages: 0,
            concurrency: 8,
            cache_dir: Some(PathBuf::from("tx_cache")),
            force_refresh: false,
            calibrate: true,
            calibration_policy: CalibrationPolicy::Fallback,
            max_failure_ratio: 0.5,
            page_retry: RetryPolicy::new(5, 500, 5_000),
            detail_retry: RetryPolicy::new(4, 300, 2_000),
            balance_retry: RetryPolicy::new(3, 500, 2_000),
            timeouts: ApiTimeouts::default(),
        }
    }
}

impl TimelineConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Worker count, never below one
    pub fn worker_count(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.page_size == 0 {
            return Err(TimelineError::Config("page size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.max_failure_ratio) {
            return Err(TimelineError::Config(format!(
                "max failure ratio must be within 0..=1, got {}",
                self.max_failure_ratio
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(TimelineError::Config("base URL is empty".into()));
        }
        Ok(())
    }
}
