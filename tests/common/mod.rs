//! Shared fixtures for the pipeline tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use balance_timeline::utils::retry::RetryPolicy;
use balance_timeline::{ApiError, ExplorerApi, TimelineConfig, TransactionPage};
use rust_decimal::Decimal;
use serde_json::{json, Value};

pub const ME: &str = "0xMe";
pub const OTHER: &str = "0xOther";

/// In-memory explorer with scripted pages, details and balance
#[derive(Default)]
pub struct MockExplorer {
    /// Pages keyed by the continuation token that requests them
    pages: HashMap<Option<String>, TransactionPage>,
    details: HashMap<String, Value>,
    /// Hashes whose detail lookups fail this many times before succeeding
    flaky: Mutex<HashMap<String, usize>>,
    broken: HashSet<String>,
    rejected: HashSet<String>,
    list_down: bool,
    balance: Option<Decimal>,
    balance_down: bool,
    pub page_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub requested_tokens: Mutex<Vec<Option<String>>>,
}

impl MockExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page answered for `token` (`None` is the first page)
    pub fn with_page(mut self, token: Option<&str>, hashes: &[&str], next: Option<&str>) -> Self {
        let hashes = hashes.iter().map(|h| h.to_string()).collect();
        self.pages.insert(
            token.map(str::to_string),
            TransactionPage::new(hashes, next.map(str::to_string)),
        );
        self
    }

    pub fn with_detail(mut self, hash: &str, detail: Value) -> Self {
        self.details.insert(hash.to_string(), detail);
        self
    }

    /// Transfer into the tracked address
    pub fn incoming(self, hash: &str, height: u64, ts: i64, amount: &str) -> Self {
        self.with_detail(hash, transfer(height, ts, OTHER, ME, amount, "0.1"))
    }

    /// Transfer out of the tracked address
    pub fn outgoing(self, hash: &str, height: u64, ts: i64, amount: &str, fee: &str) -> Self {
        self.with_detail(hash, transfer(height, ts, ME, OTHER, amount, fee))
    }

    pub fn flaky(self, hash: &str, failures: usize) -> Self {
        if let Ok(mut flaky) = self.flaky.lock() {
            flaky.insert(hash.to_string(), failures);
        }
        self
    }

    /// Detail lookups for `hash` always time out
    pub fn broken(mut self, hash: &str) -> Self {
        self.broken.insert(hash.to_string());
        self
    }

    /// Detail lookups for `hash` are refused with a client error
    pub fn rejected(mut self, hash: &str) -> Self {
        self.rejected.insert(hash.to_string());
        self
    }

    pub fn list_down(mut self) -> Self {
        self.list_down = true;
        self
    }

    pub fn with_balance(mut self, balance: &str) -> Self {
        self.balance = Some(dec(balance));
        self
    }

    pub fn balance_down(mut self) -> Self {
        self.balance_down = true;
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplorerApi for MockExplorer {
    async fn fetch_transaction_page(
        &self,
        _address: &str,
        _limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<TransactionPage, ApiError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_tokens
            .lock()
            .unwrap()
            .push(continuation_token.map(str::to_string));
        if self.list_down {
            return Err(ApiError::Transient("HTTP 503".into()));
        }
        Ok(self
            .pages
            .get(&continuation_token.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_transaction_detail(&self, hash: &str) -> Result<Value, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(hash) {
            return Err(ApiError::Transient("timed out".into()));
        }
        if self.rejected.contains(hash) {
            return Err(ApiError::Permanent("HTTP 400".into()));
        }
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(hash) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ApiError::Transient("connection reset".into()));
                }
            }
        }
        self.details.get(hash).cloned().ok_or(ApiError::NotFound)
    }

    async fn fetch_balance(&self, _address: &str) -> Result<Option<Decimal>, ApiError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.balance_down {
            return Err(ApiError::Transient("HTTP 502".into()));
        }
        Ok(self.balance)
    }
}

pub fn transfer(height: u64, ts: i64, from: &str, to: &str, amount: &str, fee: &str) -> Value {
    json!({
        "blockHeight": height,
        "timestamp": ts,
        "from": from,
        "to": to,
        "amount": amount,
        "fee": fee,
        "tips": "0",
        "type": "SendTx"
    })
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Config with no sleeping and no disk cache
pub fn test_config() -> TimelineConfig {
    TimelineConfig {
        page_size: 2,
        page_delay_ms: 0,
        concurrency: 4,
        cache_dir: None,
        page_retry: RetryPolicy::immediate(3),
        detail_retry: RetryPolicy::immediate(3),
        balance_retry: RetryPolicy::immediate(2),
        ..TimelineConfig::default()
    }
}

/// Two pages, newest first, four confirmed transfers
pub fn two_page_history() -> MockExplorer {
    MockExplorer::new()
        .with_page(None, &["h4", "h3"], Some("p2"))
        .with_page(Some("p2"), &["h2", "h1"], None)
        .incoming("h1", 100, 1_000, "50")
        .outgoing("h2", 110, 1_100, "10", "0.5")
        .incoming("h3", 120, 1_200, "5")
        .outgoing("h4", 130, 1_300, "20", "0.25")
}
