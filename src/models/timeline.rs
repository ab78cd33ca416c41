use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{Direction, TransactionRecord};

/// One step of the reconstructed balance series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub hash: String,
    pub block_height: u64,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub amount: Decimal,
    pub fee: Decimal,
    pub tips: Decimal,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub delta: Decimal,
    pub running_balance: Decimal,
}

impl BalancePoint {
    /// Consume a record into the point it produces
    pub fn from_record(record: TransactionRecord, running_balance: Decimal) -> Self {
        Self {
            hash: record.hash,
            block_height: record.block_height.get(),
            timestamp: record.timestamp,
            direction: record.direction,
            amount: record.amount,
            fee: record.fee,
            tips: record.tips,
            tx_type: record.tx_type,
            delta: record.delta,
            running_balance,
        }
    }
}

/// What happened to the calibration step of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CalibrationOutcome {
    /// Calibration was not requested, or there was nothing to calibrate;
    /// the series is relative to zero
    Skipped,
    /// Series shifted so its last point equals the live balance
    Applied { live_balance: Decimal, offset: Decimal },
    /// Live balance could not be read; the series is relative to zero
    Unavailable { reason: String },
}

/// Counters collected while paging and resolving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStats {
    pub pages: usize,
    pub listed_items: usize,
    pub unique_hashes: usize,
    pub duplicate_hashes: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    /// Resolved but unusable: zero height, not found, malformed
    pub dropped: usize,
    /// Hashes whose resolution failed after retries
    pub failed_hashes: Vec<String>,
    /// Pagination stopped at the configured page cap
    pub page_cap_reached: bool,
}

impl ResolutionStats {
    pub fn failed(&self) -> usize {
        self.failed_hashes.len()
    }
}

/// Result of one run, handed to the export sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub address: String,
    pub points: Vec<BalancePoint>,
    pub calibration: CalibrationOutcome,
    pub stats: ResolutionStats,
}

impl Timeline {
    /// True when the address has no usable transactions. This is a valid
    /// result, not a failure.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn final_balance(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.running_balance)
    }

    /// Last `n` points; `0` means all of them
    pub fn tail(&self, n: usize) -> &[BalancePoint] {
        if n == 0 || n >= self.points.len() {
            &self.points
        } else {
            &self.points[self.points.len() - n..]
        }
    }
}
