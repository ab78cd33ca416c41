//! Explorer client and detail cache implementations

pub mod explorer_api;
pub mod file_cache;
pub mod memory_cache;

use std::sync::Arc;

use tracing::info;

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::traits::detail_cache::DetailCache;

// Re-export for convenience
pub use explorer_api::{classify_status, ApiTimeouts, IdenaApi, DEFAULT_BASE_URL};
pub use file_cache::FileDetailCache;
pub use memory_cache::MemoryDetailCache;

/// Open the detail cache named by `config.cache_dir`, or an in-memory one
/// when no directory is configured
pub async fn open_detail_cache(config: &TimelineConfig) -> Result<Arc<dyn DetailCache>> {
    match &config.cache_dir {
        Some(dir) => {
            let cache = FileDetailCache::open(dir.clone()).await.map_err(TimelineError::Cache)?;
            info!("Detail cache: {}", cache.dir().display());
            Ok(Arc::new(cache))
        }
        None => {
            info!("Detail cache: in memory");
            Ok(Arc::new(MemoryDetailCache::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cache_entry::CacheEntry;
    use serde_json::json;

    #[tokio::test]
    async fn configured_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("tx_cache");
        let config = TimelineConfig { cache_dir: Some(dir.clone()), ..TimelineConfig::default() };

        let cache = open_detail_cache(&config).await.unwrap();
        cache.put(CacheEntry::new("h", json!({ "blockHeight": 1 }))).await.unwrap();
        assert!(dir.join("h.json").is_file());
    }

    #[tokio::test]
    async fn no_directory_means_memory_cache() {
        let config = TimelineConfig { cache_dir: None, ..TimelineConfig::default() };
        let cache = open_detail_cache(&config).await.unwrap();
        assert!(cache.get("h").await.is_none());
    }

    #[tokio::test]
    async fn uncreatable_directory_is_a_cache_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("plain_file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config = TimelineConfig {
            cache_dir: Some(blocker.join("tx_cache")),
            ..TimelineConfig::default()
        };

        let err = open_detail_cache(&config).await.err().unwrap();
        assert!(matches!(err, TimelineError::Cache(_)));
    }
}
