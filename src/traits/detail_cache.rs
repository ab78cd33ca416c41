use async_trait::async_trait;

use crate::models::cache_entry::CacheEntry;

/// Key-value store of transaction detail payloads, keyed by hash
#[async_trait]
pub trait DetailCache: Send + Sync {
    async fn get(&self, hash: &str) -> Option<CacheEntry>;

    /// Store an entry, overwriting any previous one for the same hash
    async fn put(&self, entry: CacheEntry) -> std::io::Result<()>;
}
