use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::CalibrationPolicy;
use crate::error::{Result, TimelineError};
use crate::models::timeline::{BalancePoint, CalibrationOutcome};
use crate::traits::data_provider::ExplorerApi;
use crate::utils::retry::{retry_with_backoff, RetryPolicy};

use super::reconstructor::RelativeSeries;

/// Anchors a relative series to the live on-chain balance
pub struct Calibrator<'a> {
    api: &'a dyn ExplorerApi,
    retry: RetryPolicy,
    policy: CalibrationPolicy,
}

impl<'a> Calibrator<'a> {
    pub fn new(api: &'a dyn ExplorerApi, retry: RetryPolicy, policy: CalibrationPolicy) -> Self {
        Self { api, retry, policy }
    }

    /// Query the live balance once and shift the series onto it. When the
    /// balance cannot be read the policy decides between the relative
    /// series and a failed run.
    pub async fn calibrate(
        &self,
        address: &str,
        series: RelativeSeries,
    ) -> Result<(Vec<BalancePoint>, CalibrationOutcome)> {
        let live = match self.live_balance(address).await {
            Ok(live) => live,
            Err(reason) => {
                return match self.policy {
                    CalibrationPolicy::Fail => Err(TimelineError::CalibrationUnavailable(reason)),
                    CalibrationPolicy::Fallback => {
                        warn!("Live balance unavailable ({}), keeping relative series", reason);
                        Ok((series.uncalibrated(), CalibrationOutcome::Unavailable { reason }))
                    }
                };
            }
        };

        let (points, offset) = series.calibrate(live)?;
        info!("Calibrated to live balance {} (offset {})", live, offset);
        Ok((points, CalibrationOutcome::Applied { live_balance: live, offset }))
    }

    async fn live_balance(&self, address: &str) -> std::result::Result<Decimal, String> {
        let api = self.api;
        retry_with_backoff(self.retry, "balance", || api.fetch_balance(address))
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "response carried no balance".to_string())
    }
}

/// Calibration was not requested
pub fn skip(series: RelativeSeries) -> (Vec<BalancePoint>, CalibrationOutcome) {
    (series.uncalibrated(), CalibrationOutcome::Skipped)
}
