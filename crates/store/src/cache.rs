//! Content-addressed cache of fetched package trees
//!
//! Entries live under `<root>/objects/<hh>/<hash>` where `hash` is the
//! source hash of the fetched descriptor. An entry is only visible once
//! fully written: fetches stage into a sibling directory and commit with
//! an atomic rename, so readers never observe a partial tree.

use dashmap::DashMap;
use pakt_errors::{Error, StorageError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Exclusive per-key fetch permit.
///
/// Holding the guard guarantees no other task is fetching or committing
/// the same cache key.
pub struct CacheGuard {
    _permit: OwnedMutexGuard<()>,
}

/// Content-addressed package cache
#[derive(Clone)]
pub struct PackageCache {
    objects_path: PathBuf,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl PackageCache {
    /// Create a cache rooted at `root` (entries under `root/objects`)
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            objects_path: root.join("objects"),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Acquire the exclusive fetch lock for a cache key.
    ///
    /// At most one concurrent fetch per key: a second resolver asking for
    /// the same package parks here until the first commits or fails.
    pub async fn lock(&self, key: &str) -> CacheGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        CacheGuard {
            _permit: mutex.lock_owned().await,
        }
    }

    /// Final directory for a cache key
    #[must_use]
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let prefix = &key[..key.len().min(2)];
        self.objects_path.join(prefix).join(key)
    }

    /// Whether a committed entry exists for the key
    pub async fn has_entry(&self, key: &str) -> bool {
        tokio::fs::metadata(self.entry_path(key)).await.is_ok()
    }

    /// Staging directory for an in-flight fetch of `key`.
    ///
    /// The directory is created empty; any remnant of an earlier aborted
    /// fetch is removed first.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from directory creation.
    pub async fn begin_staging(&self, key: &str) -> Result<PathBuf, Error> {
        let staging = self.staging_path(key);
        if tokio::fs::metadata(&staging).await.is_ok() {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| Error::io_with_path(&e, &staging))?;
        }
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| Error::io_with_path(&e, &staging))?;
        Ok(staging)
    }

    /// Commit a staged fetch, making the entry visible.
    ///
    /// # Errors
    ///
    /// `StorageError::CorruptedEntry` when nothing was staged; I/O errors
    /// from the rename.
    pub async fn commit(&self, key: &str) -> Result<PathBuf, Error> {
        let staging = self.staging_path(key);
        if tokio::fs::metadata(&staging).await.is_err() {
            return Err(StorageError::CorruptedEntry {
                key: key.to_string(),
            }
            .into());
        }
        let dest = self.entry_path(key);
        tokio::fs::rename(&staging, &dest)
            .await
            .map_err(|e| Error::io_with_path(&e, &dest))?;
        debug!(key, path = %dest.display(), "cache entry committed");
        Ok(dest)
    }

    /// Drop any staged data for `key` (fetch aborted)
    pub async fn abort(&self, key: &str) {
        let _ = tokio::fs::remove_dir_all(self.staging_path(key)).await;
    }

    /// Remove a committed entry, undoing a `commit`.
    pub async fn remove_entry(&self, key: &str) {
        let _ = tokio::fs::remove_dir_all(self.entry_path(key)).await;
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        let prefix = &key[..key.len().min(2)];
        self.objects_path.join(prefix).join(format!(".staging-{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn staged_entries_are_invisible_until_commit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(tmp.path());
        let key = "abcdef0123456789";

        let _guard = cache.lock(key).await;
        assert!(!cache.has_entry(key).await);

        let staging = cache.begin_staging(key).await.unwrap();
        tokio::fs::write(staging.join("file.txt"), b"data")
            .await
            .unwrap();
        assert!(!cache.has_entry(key).await);

        let dest = cache.commit(key).await.unwrap();
        assert!(cache.has_entry(key).await);
        assert_eq!(
            tokio::fs::read(dest.join("file.txt")).await.unwrap(),
            b"data"
        );
    }

    #[tokio::test]
    async fn abort_discards_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(tmp.path());
        let key = "deadbeef";

        let staging = cache.begin_staging(key).await.unwrap();
        tokio::fs::write(staging.join("partial"), b"x").await.unwrap();
        cache.abort(key).await;
        assert!(!cache.has_entry(key).await);
        assert!(cache.commit(key).await.is_err());
    }

    #[tokio::test]
    async fn remove_entry_undoes_a_commit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(tmp.path());
        let key = "0123abcd";

        let staging = cache.begin_staging(key).await.unwrap();
        tokio::fs::write(staging.join("file"), b"x").await.unwrap();
        cache.commit(key).await.unwrap();
        assert!(cache.has_entry(key).await);

        cache.remove_entry(key).await;
        assert!(!cache.has_entry(key).await);
    }

    #[tokio::test]
    async fn per_key_lock_serializes_fetches() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(tmp.path());
        let key = "cafebabe";

        let guard = cache.lock(key).await;
        let cache2 = cache.clone();
        let contender = tokio::spawn(async move {
            let _g = cache2.lock("cafebabe").await;
        });

        // The contender cannot finish while the first guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_keys_do_not_contend() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(tmp.path());

        let _a = cache.lock("key-a").await;
        // Locking a different key must not block.
        let _b = cache.lock("key-b").await;
    }
}
