use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored detail payload for one transaction hash.
/// On-chain detail never changes, so an entry is never invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub hash: String,
    pub fetched_at: DateTime<Utc>,
    pub detail: Value,
}

impl CacheEntry {
    pub fn new(hash: impl Into<String>, detail: Value) -> Self {
        Self {
            hash: hash.into(),
            fetched_at: Utc::now(),
            detail,
        }
    }

    /// Decode a stored file. Files written before entries carried an
    /// envelope hold the bare detail object; `null` is never a hit.
    pub fn decode(hash: &str, raw: Value) -> Option<Self> {
        if raw.is_null() {
            return None;
        }
        let is_envelope = raw
            .as_object()
            .is_some_and(|o| o.contains_key("fetchedAt") && o.contains_key("detail"));
        if is_envelope {
            return serde_json::from_value::<CacheEntry>(raw)
                .ok()
                .filter(|entry| !entry.detail.is_null());
        }
        Some(Self {
            hash: hash.to_string(),
            fetched_at: DateTime::<Utc>::UNIX_EPOCH,
            detail: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_round_trips_through_decode() {
        let entry = CacheEntry::new("h", json!({ "blockHeight": 1 }));
        let raw = serde_json::to_value(&entry).unwrap();
        assert_eq!(CacheEntry::decode("h", raw), Some(entry));
    }

    #[test]
    fn legacy_bare_detail_is_accepted() {
        let decoded = CacheEntry::decode("h", json!({ "blockHeight": 5 })).unwrap();
        assert_eq!(decoded.detail, json!({ "blockHeight": 5 }));
        assert_eq!(decoded.fetched_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn null_is_a_miss() {
        assert_eq!(CacheEntry::decode("h", Value::Null), None);
    }
}
