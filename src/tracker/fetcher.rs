use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::TimelineConfig;
use crate::error::{ApiError, Result};
use crate::models::cache_entry::CacheEntry;
use crate::traits::{data_provider::ExplorerApi, detail_cache::DetailCache};
use crate::utils::retry::{retry_with_backoff, RetryPolicy};

use super::pager::{StopReason, TransactionPager};

const PROGRESS_EVERY: usize = 200;

/// Unique hashes collected from every page, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedHashes {
    pub hashes: Vec<String>,
    pub pages: usize,
    pub listed_items: usize,
    pub duplicates: usize,
    pub page_cap_reached: bool,
}

/// Outcome of resolving one hash
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved { detail: Value, from_cache: bool },
    /// The detail endpoint answered 404
    NotFound,
    /// The detail endpoint answered with something unusable
    Invalid(String),
    /// Retries exhausted
    Failed(String),
}

/// Resolution outcomes keyed by hash; independent of completion order
pub type ResolvedDetails = DashMap<String, Resolution>;

/// Pages the list endpoint and resolves transaction details
pub struct TransactionFetcher {
    api: Arc<dyn ExplorerApi>,
    cache: Arc<dyn DetailCache>,
    config: TimelineConfig,
}

impl TransactionFetcher {
    pub fn new(api: Arc<dyn ExplorerApi>, cache: Arc<dyn DetailCache>, config: TimelineConfig) -> Self {
        Self { api, cache, config }
    }

    /// Pager over the address transaction list
    pub fn pager<'a>(&'a self, address: &str) -> TransactionPager<'a> {
        TransactionPager::new(
            self.api.as_ref(),
            address,
            self.config.page_size,
            self.config.max_pages,
            self.config.page_delay(),
            self.config.page_retry,
        )
    }

    /// Walk every page and collect hashes. Page order is preserved and a
    /// hash seen on an earlier page wins over later repeats.
    pub async fn collect_hashes(&self, address: &str) -> Result<CollectedHashes> {
        let mut pager = self.pager(address);
        let mut seen = HashSet::new();
        let mut collected = CollectedHashes::default();

        while let Some(page) = pager.next_page().await? {
            collected.listed_items += page.item_count;
            for hash in page.hashes {
                if seen.insert(hash.clone()) {
                    collected.hashes.push(hash);
                } else {
                    collected.duplicates += 1;
                }
            }
            info!(
                "Page {}: {} items, {} unique hashes so far",
                pager.pages_fetched(),
                page.item_count,
                collected.hashes.len()
            );
        }

        collected.pages = pager.pages_fetched();
        collected.page_cap_reached = pager.stop_reason() == Some(StopReason::PageCap);
        if collected.duplicates > 0 {
            debug!("Dropped {} duplicate hashes across pages", collected.duplicates);
        }
        Ok(collected)
    }

    /// Resolve every hash on a fixed pool of workers draining a shared
    /// queue. Returns once all hashes have an outcome.
    pub async fn resolve_details(&self, hashes: &[String]) -> ResolvedDetails {
        let results: Arc<ResolvedDetails> = Arc::new(DashMap::with_capacity(hashes.len()));
        if hashes.is_empty() {
            return DashMap::new();
        }

        let (tx, rx) = mpsc::channel::<String>(hashes.len());
        for hash in hashes {
            // capacity covers every hash, so this never waits
            if tx.send(hash.clone()).await.is_err() {
                break;
            }
        }
        drop(tx);

        let rx = Arc::new(Mutex::new(rx));
        let done = Arc::new(AtomicUsize::new(0));
        let total = hashes.len();
        let workers = self.config.worker_count().min(total);
        info!("Resolving {} transactions with {} workers", total, workers);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let rx = Arc::clone(&rx);
            let results = Arc::clone(&results);
            let done = Arc::clone(&done);
            let api = Arc::clone(&self.api);
            let cache = Arc::clone(&self.cache);
            let retry = self.config.detail_retry;
            let force_refresh = self.config.force_refresh;

            handles.push(tokio::spawn(async move {
                loop {
                    let next = { rx.lock().await.recv().await };
                    let Some(hash) = next else { break };

                    let outcome =
                        resolve_one(api.as_ref(), cache.as_ref(), &hash, retry, force_refresh).await;
                    results.insert(hash, outcome);

                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if finished % PROGRESS_EVERY == 0 {
                        info!("Resolved {}/{}", finished, total);
                    }
                }
                debug!("Worker {} drained the queue", worker_id);
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Resolution worker aborted: {}", e);
            }
        }

        for hash in hashes {
            if !results.contains_key(hash) {
                results.insert(hash.clone(), Resolution::Failed("worker aborted".to_string()));
            }
        }

        Arc::try_unwrap(results).unwrap_or_else(|shared| (*shared).clone())
    }
}

/// Cache first (unless force-refreshing), then the live endpoint
async fn resolve_one(
    api: &dyn ExplorerApi,
    cache: &dyn DetailCache,
    hash: &str,
    retry: RetryPolicy,
    force_refresh: bool,
) -> Resolution {
    if !force_refresh {
        if let Some(entry) = cache.get(hash).await {
            return Resolution::Resolved { detail: entry.detail, from_cache: true };
        }
    }

    let label = format!("detail {}", hash);
    match retry_with_backoff(retry, &label, || api.fetch_transaction_detail(hash)).await {
        Ok(detail) => {
            if let Err(e) = cache.put(CacheEntry::new(hash, detail.clone())).await {
                warn!("Failed to cache detail for {}: {}", hash, e);
            }
            Resolution::Resolved { detail, from_cache: false }
        }
        Err(ApiError::NotFound) => Resolution::NotFound,
        Err(ApiError::Permanent(reason)) => Resolution::Invalid(reason),
        Err(e) => Resolution::Failed(e.to_string()),
    }
}
