use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{RecordError, Result, TimelineError};
use crate::models::timeline::BalancePoint;
use crate::models::transaction::TransactionRecord;

use super::fetcher::{Resolution, ResolvedDetails};

/// Records ready for reconstruction plus everything that was set aside
#[derive(Debug, Default)]
pub struct RecordSet {
    pub records: Vec<TransactionRecord>,
    pub rejected: Vec<RecordError>,
    pub failed_hashes: Vec<String>,
    pub cache_hits: usize,
    pub fetched: usize,
}

/// Turn resolution outcomes into records, walking `hashes` in discovery
/// order. Only records with a non-zero block height come out.
pub fn build_records(address: &str, hashes: &[String], details: &ResolvedDetails) -> RecordSet {
    let mut set = RecordSet::default();

    for hash in hashes {
        let Some(outcome) = details.get(hash) else {
            set.failed_hashes.push(hash.clone());
            continue;
        };
        match outcome.value() {
            Resolution::Resolved { detail, from_cache } => {
                if *from_cache {
                    set.cache_hits += 1;
                } else {
                    set.fetched += 1;
                }
                match TransactionRecord::from_detail(hash, detail, address) {
                    Ok(record) => set.records.push(record),
                    Err(e) => {
                        debug!("Dropping record: {}", e);
                        set.rejected.push(e);
                    }
                }
            }
            Resolution::NotFound => set.rejected.push(RecordError::NotFound { hash: hash.clone() }),
            Resolution::Invalid(reason) => set.rejected.push(RecordError::Malformed {
                hash: hash.clone(),
                reason: reason.clone(),
            }),
            Resolution::Failed(_) => set.failed_hashes.push(hash.clone()),
        }
    }

    set
}

/// Balance series that starts at zero and has not been calibrated.
///
/// It can be turned into final points exactly once, either shifted by a
/// live balance or left relative, so calibration cannot be applied twice.
#[derive(Debug, PartialEq)]
pub struct RelativeSeries {
    points: Vec<BalancePoint>,
}

impl RelativeSeries {
    pub fn points(&self) -> &[BalancePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Running balance of the last point, zero for an empty series
    pub fn final_balance(&self) -> Decimal {
        self.points.last().map(|p| p.running_balance).unwrap_or(Decimal::ZERO)
    }

    /// Keep the series relative to zero
    pub fn uncalibrated(self) -> Vec<BalancePoint> {
        self.points
    }

    /// Shift every running balance so the last one equals `live_balance`.
    /// Deltas are untouched. Returns the points and the applied offset.
    pub fn calibrate(self, live_balance: Decimal) -> Result<(Vec<BalancePoint>, Decimal)> {
        let overflow = |hash: &str| TimelineError::BalanceOverflow { hash: hash.to_string() };
        let last_hash = self.points.last().map(|p| p.hash.clone()).unwrap_or_default();
        let offset = live_balance
            .checked_sub(self.final_balance())
            .ok_or_else(|| overflow(&last_hash))?;

        let points = self
            .points
            .into_iter()
            .map(|mut point| {
                point.running_balance = point
                    .running_balance
                    .checked_add(offset)
                    .ok_or_else(|| overflow(&point.hash))?;
                Ok(point)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((points, offset))
    }
}

/// Sort records chronologically and fold them into a running balance.
///
/// Order is `(block height, timestamp, hash)`. A hash that appears more
/// than once keeps its first occurrence. Fails if the running balance
/// leaves the `Decimal` range.
pub fn reconstruct(records: Vec<TransactionRecord>) -> Result<RelativeSeries> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut records: Vec<TransactionRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.hash.clone()))
        .collect();
    records.sort_by(TransactionRecord::chronological_cmp);

    let mut balance = Decimal::ZERO;
    let mut points = Vec::with_capacity(records.len());
    for record in records {
        balance = balance
            .checked_add(record.delta)
            .ok_or_else(|| TimelineError::BalanceOverflow { hash: record.hash.clone() })?;
        points.push(BalancePoint::from_record(record, balance));
    }

    Ok(RelativeSeries { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::Direction;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::num::NonZeroU64;

    const ME: &str = "0xme";

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn record(hash: &str, height: u64, ts: i64, direction: Direction, amount: &str) -> TransactionRecord {
        let (amount, fee) = (dec(amount), dec("0.1"));
        TransactionRecord {
            hash: hash.to_string(),
            block_height: NonZeroU64::new(height).unwrap(),
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
            amount,
            fee,
            tips: Decimal::ZERO,
            direction,
            delta: direction.delta(amount, fee, Decimal::ZERO).unwrap(),
            tx_type: None,
        }
    }

    fn two_step_series() -> RelativeSeries {
        reconstruct(vec![
            record("a", 1, 1, Direction::Incoming, "10"),
            record("b", 2, 2, Direction::Outgoing, "3"),
        ])
        .unwrap()
    }

    #[test]
    fn points_are_sorted_by_height_then_time_then_hash() {
        let series = reconstruct(vec![
            record("c", 20, 100, Direction::Incoming, "1"),
            record("b", 10, 200, Direction::Incoming, "1"),
            record("a", 10, 200, Direction::Incoming, "1"),
            record("d", 10, 150, Direction::Incoming, "1"),
        ])
        .unwrap();
        let order: Vec<_> = series.points().iter().map(|p| p.hash.as_str()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn running_balance_accumulates_signed_deltas() {
        let series = reconstruct(vec![
            record("a", 1, 1, Direction::Incoming, "10"),
            record("b", 2, 2, Direction::Outgoing, "3"),
            record("c", 3, 3, Direction::SelfTransfer, "50"),
        ])
        .unwrap();
        let points = series.uncalibrated();
        assert_eq!(points[0].delta, dec("10"));
        assert_eq!(points[1].delta, dec("-3.1"));
        assert_eq!(points[2].delta, dec("-0.1"));
        assert_eq!(points[0].running_balance, dec("10"));
        for i in 1..points.len() {
            assert_eq!(points[i].running_balance, points[i - 1].running_balance + points[i].delta);
        }
        assert_eq!(points[2].running_balance, dec("6.8"));
    }

    #[test]
    fn calibration_shifts_balances_but_not_deltas() {
        let relative = two_step_series().uncalibrated();
        let (points, offset) = two_step_series().calibrate(dec("100")).unwrap();

        assert_eq!(offset, dec("100") - dec("6.9"));
        assert_eq!(points.last().unwrap().running_balance, dec("100"));
        assert_eq!(points[0].running_balance, offset + points[0].delta);
        for (calibrated, raw) in points.iter().zip(&relative) {
            assert_eq!(calibrated.delta, raw.delta);
            assert_eq!(calibrated.running_balance - raw.running_balance, offset);
        }
    }

    #[test]
    fn duplicate_hashes_keep_first_occurrence() {
        let series = reconstruct(vec![
            record("a", 5, 1, Direction::Incoming, "1"),
            record("a", 9, 1, Direction::Incoming, "2"),
        ])
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].block_height, 5);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = reconstruct(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.final_balance(), Decimal::ZERO);
        let (points, offset) = series.calibrate(dec("5")).unwrap();
        assert!(points.is_empty());
        assert_eq!(offset, dec("5"));
    }

    #[test]
    fn running_balance_overflow_is_an_error() {
        let err = reconstruct(vec![
            record("max", 1, 1, Direction::Incoming, "79228162514264337593543950335"),
            record("one", 2, 2, Direction::Incoming, "1"),
        ])
        .unwrap_err();
        assert!(matches!(err, TimelineError::BalanceOverflow { ref hash } if hash == "one"));
    }

    #[test]
    fn calibration_offset_overflow_is_an_error() {
        let series = reconstruct(vec![record("out", 1, 1, Direction::Outgoing, "1000")]).unwrap();
        let err = series.calibrate(Decimal::MAX).unwrap_err();
        assert!(matches!(err, TimelineError::BalanceOverflow { ref hash } if hash == "out"));
    }

    #[test]
    fn build_records_sorts_outcomes_into_buckets() {
        let details = ResolvedDetails::new();
        details.insert(
            "ok".into(),
            Resolution::Resolved { detail: json!({ "blockHeight": 4, "to": ME, "amount": "1" }), from_cache: true },
        );
        details.insert(
            "zero".into(),
            Resolution::Resolved { detail: json!({ "blockHeight": 0, "to": ME }), from_cache: false },
        );
        details.insert("gone".into(), Resolution::NotFound);
        details.insert("bad".into(), Resolution::Invalid("not json".into()));
        details.insert("down".into(), Resolution::Failed("timeout".into()));

        let hashes: Vec<String> = ["ok", "zero", "gone", "bad", "down", "missing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let set = build_records(ME, &hashes, &details);

        assert_eq!(set.records.len(), 1);
        assert_eq!(set.records[0].hash, "ok");
        assert_eq!(set.rejected.len(), 3);
        assert_eq!(set.failed_hashes, vec!["down".to_string(), "missing".to_string()]);
        assert_eq!(set.cache_hits, 1);
        assert_eq!(set.fetched, 1);
    }
}
