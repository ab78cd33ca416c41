use serde_json::Value;

use crate::utils::helper::{get_ci, get_str};

const HASH_FIELDS: &[&str] = &["hash", "txHash", "transactionHash", "id", "txId"];

/// One page of the address transaction list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPage {
    /// Hashes in response order; items without a hash are skipped
    pub hashes: Vec<String>,
    /// Number of items the endpoint returned, hash or not
    pub item_count: usize,
    pub continuation_token: Option<String>,
}

impl TransactionPage {
    pub fn new(hashes: Vec<String>, continuation_token: Option<String>) -> Self {
        Self { item_count: hashes.len(), hashes, continuation_token }
    }

    /// Parse a list response. Accepts a bare array, an object with
    /// `items`/`txs`, or a `result` wrapper around either.
    pub fn from_payload(payload: &Value) -> Self {
        let (items, token) = match payload {
            Value::Array(items) => (items.as_slice(), None),
            Value::Object(_) => {
                let mut token = get_token(payload);
                let mut items = get_items(payload);
                if items.is_empty() {
                    match get_ci(payload, &["result"]) {
                        Some(res) if res.is_object() => {
                            token = get_token(res).or(token);
                            items = get_items(res);
                        }
                        Some(Value::Array(list)) => items = list.as_slice(),
                        _ => {}
                    }
                }
                (items, token)
            }
            _ => (&[][..], None),
        };

        Self {
            hashes: items.iter().filter_map(hash_from_item).collect(),
            item_count: items.len(),
            continuation_token: token,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

fn get_token(value: &Value) -> Option<String> {
    get_str(value, &["continuationToken", "continuation_token"]).map(str::to_string)
}

fn get_items(value: &Value) -> &[Value] {
    get_ci(value, &["items", "txs"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Extract a transaction hash from a list item
pub fn hash_from_item(item: &Value) -> Option<String> {
    if let Some(s) = item.as_str().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(s.to_string());
    }
    get_str(item, HASH_FIELDS)
        .or_else(|| {
            get_ci(item, &["tx", "transaction"])
                .filter(|nested| nested.is_object())
                .and_then(|nested| get_str(nested, HASH_FIELDS))
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_top_level_items_and_token() {
        let page = TransactionPage::from_payload(&json!({
            "items": [{ "hash": "a" }, { "hash": "b" }],
            "continuationToken": "next"
        }));
        assert_eq!(page.hashes, vec!["a", "b"]);
        assert_eq!(page.continuation_token.as_deref(), Some("next"));
    }

    #[test]
    fn parses_result_wrapper() {
        let page = TransactionPage::from_payload(&json!({
            "result": { "txs": [{ "tx": { "txHash": "a" } }], "ContinuationToken": "t" }
        }));
        assert_eq!(page.hashes, vec!["a"]);
        assert_eq!(page.continuation_token.as_deref(), Some("t"));
    }

    #[test]
    fn parses_bare_list_of_strings() {
        let page = TransactionPage::from_payload(&json!(["a", " b "]));
        assert_eq!(page.hashes, vec!["a", "b"]);
        assert_eq!(page.continuation_token, None);
    }

    #[test]
    fn items_without_hash_are_counted_but_skipped() {
        let page = TransactionPage::from_payload(&json!({ "result": [{ "foo": 1 }, { "id": "x" }] }));
        assert_eq!(page.hashes, vec!["x"]);
        assert_eq!(page.item_count, 2);
        assert!(!page.is_empty());
    }

    #[test]
    fn empty_token_means_end_of_pagination() {
        let page = TransactionPage::from_payload(&json!({ "items": [], "continuationToken": "" }));
        assert!(page.is_empty());
        assert_eq!(page.continuation_token, None);
    }
}
