use std::cmp::Ordering;
use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;
use crate::utils::helper::{get_ci, get_str, parse_decimal, parse_timestamp, parse_u64};

/// How a transaction moved value relative to the tracked address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "in")]
    Incoming,
    #[serde(rename = "out")]
    Outgoing,
    /// Sender and receiver are both the tracked address
    #[serde(rename = "self")]
    SelfTransfer,
    /// Neither side is the tracked address
    #[serde(rename = "other")]
    Unrelated,
}

impl Direction {
    /// Compare counterparties to the tracked address, ignoring case
    pub fn classify(sender: Option<&str>, receiver: Option<&str>, tracked: &str) -> Self {
        let is_tracked = |side: Option<&str>| side.is_some_and(|s| s.eq_ignore_ascii_case(tracked));
        match (is_tracked(sender), is_tracked(receiver)) {
            (true, false) => Direction::Outgoing,
            (false, true) => Direction::Incoming,
            (true, true) => Direction::SelfTransfer,
            (false, false) => Direction::Unrelated,
        }
    }

    /// Signed balance change. Fee and tips only count when the tracked
    /// address paid them. `None` when the sum does not fit a `Decimal`.
    pub fn delta(self, amount: Decimal, fee: Decimal, tips: Decimal) -> Option<Decimal> {
        match self {
            Direction::Outgoing => amount.checked_add(fee)?.checked_add(tips).map(|d| -d),
            Direction::Incoming => Some(amount),
            Direction::SelfTransfer => fee.checked_add(tips).map(|d| -d),
            Direction::Unrelated => Some(Decimal::ZERO),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "in",
            Direction::Outgoing => "out",
            Direction::SelfTransfer => "self",
            Direction::Unrelated => "other",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved transaction with a confirmed block height
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub hash: String,
    pub block_height: NonZeroU64,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub tips: Decimal,
    pub direction: Direction,
    /// Signed change this transaction makes to the tracked balance
    pub delta: Decimal,
    pub tx_type: Option<String>,
}

impl TransactionRecord {
    /// Build a record from a detail payload.
    ///
    /// A missing, unparsable or zero block height is a [`RecordError`]: such a
    /// transaction is unconfirmed and must never reach the timeline.
    pub fn from_detail(hash: &str, detail: &Value, tracked: &str) -> Result<Self, RecordError> {
        if !detail.is_object() {
            return Err(RecordError::Malformed {
                hash: hash.to_string(),
                reason: "detail is not a JSON object".to_string(),
            });
        }

        let block_height = parse_u64(get_ci(detail, &["blockHeight"]))
            .and_then(NonZeroU64::new)
            .ok_or_else(|| RecordError::MissingBlockHeight { hash: hash.to_string() })?;

        let timestamp = parse_timestamp(get_ci(detail, &["timestamp"]))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let sender = get_str(detail, &["from", "sender"]);
        let receiver = get_str(detail, &["to", "receiver"]);
        let direction = Direction::classify(sender, receiver, tracked);

        let amount = parse_decimal(get_ci(detail, &["amount", "value"])).abs();
        let fee = parse_decimal(get_ci(detail, &["fee"])).abs();
        let tips = parse_decimal(get_ci(detail, &["tips"])).abs();
        let delta = direction.delta(amount, fee, tips).ok_or_else(|| RecordError::Malformed {
            hash: hash.to_string(),
            reason: "amount, fee and tips overflow".to_string(),
        })?;

        Ok(Self {
            hash: hash.to_string(),
            block_height,
            timestamp,
            amount,
            fee,
            tips,
            direction,
            delta,
            tx_type: get_str(detail, &["type"]).map(str::to_string),
        })
    }

    pub fn delta(&self) -> Decimal {
        self.delta
    }

    /// Chronological order: block height, then timestamp, then hash
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.block_height
            .cmp(&other.block_height)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.hash.cmp(&other.hash))
    }
}
