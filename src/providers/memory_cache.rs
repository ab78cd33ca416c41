use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::cache_entry::CacheEntry;
use crate::traits::detail_cache::DetailCache;

/// Process-local detail cache, used for `--no-cache` runs and tests
#[derive(Debug, Default)]
pub struct MemoryDetailCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryDetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DetailCache for MemoryDetailCache {
    async fn get(&self, hash: &str) -> Option<CacheEntry> {
        self.entries.get(hash).map(|entry| entry.value().clone())
    }

    async fn put(&self, entry: CacheEntry) -> std::io::Result<()> {
        self.entries.insert(entry.hash.clone(), entry);
        Ok(())
    }
}
