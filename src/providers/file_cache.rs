use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::cache_entry::CacheEntry;
use crate::traits::detail_cache::DetailCache;

/// Durable detail cache: one JSON file per hash under a directory.
///
/// Writes go to a temporary file that is renamed into place, so concurrent
/// resolvers and interrupted runs never leave a half-written entry behind.
pub struct FileDetailCache {
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileDetailCache {
    /// Open the cache, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!("Detail cache at {}", dir.display());
        Ok(Self {
            dir,
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `hash`
    pub fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(hash)))
    }
}

/// Hashes are hex strings; anything else is mapped so it cannot escape the directory
fn file_stem(hash: &str) -> String {
    hash.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl DetailCache for FileDetailCache {
    async fn get(&self, hash: &str) -> Option<CacheEntry> {
        let path = self.entry_path(hash);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(raw) => CacheEntry::decode(hash, raw),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn put(&self, entry: CacheEntry) -> std::io::Result<()> {
        let path = self.entry_path(&entry.hash);
        let tmp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            file_stem(&entry.hash),
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        let body = serde_json::to_vec(&entry)?;
        tokio::fs::write(&tmp, body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }
}
