use serde::Serialize;

use crate::models::timeline::BalancePoint;
use crate::utils::helper::iso_utc;

/// Row of the full timeline export (JSONL and CSV)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub hash: String,
    pub block: u64,
    /// Unix seconds
    pub timestamp: i64,
    pub direction: &'static str,
    pub amount: String,
    pub fee: String,
    pub tips: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub delta: String,
    pub balance: String,
}

impl From<&BalancePoint> for TimelineRow {
    fn from(point: &BalancePoint) -> Self {
        Self {
            hash: point.hash.clone(),
            block: point.block_height,
            timestamp: point.timestamp.timestamp(),
            direction: point.direction.as_str(),
            amount: point.amount.to_string(),
            fee: point.fee.to_string(),
            tips: point.tips.to_string(),
            tx_type: point.tx_type.clone().unwrap_or_default(),
            delta: point.delta.to_string(),
            balance: point.running_balance.to_string(),
        }
    }
}

/// Row of the tail export, with a readable UTC time column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailRow {
    pub block: u64,
    pub timestamp: i64,
    pub iso_utc: String,
    pub direction: &'static str,
    pub amount: String,
    pub fee: String,
    pub tips: String,
    pub balance: String,
    pub hash: String,
}

impl From<&BalancePoint> for TailRow {
    fn from(point: &BalancePoint) -> Self {
        Self {
            block: point.block_height,
            timestamp: point.timestamp.timestamp(),
            iso_utc: iso_utc(&point.timestamp),
            direction: point.direction.as_str(),
            amount: point.amount.to_string(),
            fee: point.fee.to_string(),
            tips: point.tips.to_string(),
            balance: point.running_balance.to_string(),
            hash: point.hash.clone(),
        }
    }
}
