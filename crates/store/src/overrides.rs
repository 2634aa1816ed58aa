//! Manual override store
//!
//! Overrides map a package identity to a local directory and always win
//! over network resolution. Entries are persisted as JSON under the store
//! root and survive process restart. Reads are lock-free; writes
//! serialize against each other and rewrite the persisted file.

use dashmap::DashMap;
use pakt_errors::{Error, StorageError};
use pakt_manifest::Manifest;
use pakt_types::{PackageId, PackagePath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const OVERRIDES_FILE: &str = "overrides.json";

#[derive(Debug, Serialize, Deserialize)]
struct OverrideEntry {
    id: PackageId,
    dir: PathBuf,
}

/// Persistent PackageId -> directory override mapping
#[derive(Clone)]
pub struct OverrideStore {
    file: PathBuf,
    entries: Arc<DashMap<PackageId, PathBuf>>,
    write_lock: Arc<Mutex<()>>,
}

impl OverrideStore {
    /// Load the store persisted under `root`, or start empty.
    ///
    /// # Errors
    ///
    /// `StorageError::IoError` when an existing file cannot be parsed.
    pub async fn load(root: &Path) -> Result<Self, Error> {
        let file = root.join(OVERRIDES_FILE);
        let entries = Arc::new(DashMap::new());

        if let Ok(content) = tokio::fs::read_to_string(&file).await {
            let persisted: Vec<OverrideEntry> =
                serde_json::from_str(&content).map_err(|e| StorageError::IoError {
                    message: format!("corrupt override store {}: {e}", file.display()),
                })?;
            for entry in persisted {
                entries.insert(entry.id, entry.dir);
            }
        }

        Ok(Self {
            file,
            entries,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Register overrides for every package `source_dir` provides.
    ///
    /// Reads the directory's own manifest and inserts
    /// `PackageId(prefix/original-path, original-version) -> source_dir`.
    ///
    /// # Errors
    ///
    /// Manifest and persistence errors.
    pub async fn add_overrides(
        &self,
        prefix: &PackagePath,
        source_dir: &Path,
    ) -> Result<Vec<PackageId>, Error> {
        let manifest = Manifest::load(source_dir).await?;
        let original = manifest.package_id()?;
        let id = PackageId::new(prefix.join(&original.path), original.version);

        let _write = self.write_lock.lock().await;
        self.entries.insert(id.clone(), source_dir.to_path_buf());
        self.persist().await?;
        info!(package = %id, dir = %source_dir.display(), "override registered");
        Ok(vec![id])
    }

    /// Remove the override for an exact identity.
    ///
    /// # Errors
    ///
    /// `StorageError::OverrideNotFound` when nothing matched.
    pub async fn remove_override(&self, id: &PackageId) -> Result<(), Error> {
        let _write = self.write_lock.lock().await;
        if self.entries.remove(id).is_none() {
            return Err(StorageError::OverrideNotFound {
                entry: id.to_string(),
            }
            .into());
        }
        self.persist().await
    }

    /// Remove every override pointing at `source_dir`.
    ///
    /// # Errors
    ///
    /// `StorageError::OverrideNotFound` when nothing matched.
    pub async fn remove_overrides_by_dir(&self, source_dir: &Path) -> Result<usize, Error> {
        let _write = self.write_lock.lock().await;
        let matching: Vec<PackageId> = self
            .entries
            .iter()
            .filter(|e| e.value() == source_dir)
            .map(|e| e.key().clone())
            .collect();
        if matching.is_empty() {
            return Err(StorageError::OverrideNotFound {
                entry: source_dir.display().to_string(),
            }
            .into());
        }
        for id in &matching {
            self.entries.remove(id);
        }
        self.persist().await?;
        Ok(matching.len())
    }

    /// Find the override for a requested path, if any.
    ///
    /// A request matches an entry whose path equals it, or whose path
    /// ends with it (so a package registered under a prefix is still
    /// found by its original name). Ties resolve to the lowest identity
    /// for determinism.
    #[must_use]
    pub fn lookup(&self, path: &PackagePath) -> Option<(PackageId, PathBuf)> {
        self.entries
            .iter()
            .filter(|e| {
                let p = &e.key().path;
                p == path || segment_suffix(p, path)
            })
            .map(|e| (e.key().clone(), e.value().clone()))
            .min_by(|a, b| a.0.cmp(&b.0))
    }

    /// Number of registered overrides
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn persist(&self) -> Result<(), Error> {
        let mut persisted: Vec<OverrideEntry> = self
            .entries
            .iter()
            .map(|e| OverrideEntry {
                id: e.key().clone(),
                dir: e.value().clone(),
            })
            .collect();
        persisted.sort_by(|a, b| a.id.cmp(&b.id));

        let content = serde_json::to_string_pretty(&persisted)
            .map_err(|e| Error::internal(format!("override serialization: {e}")))?;
        tokio::fs::write(&self.file, content)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.file))?;
        Ok(())
    }
}

fn segment_suffix(longer: &PackagePath, suffix: &PackagePath) -> bool {
    let l = longer.segments();
    let s = suffix.segments();
    l.len() > s.len() && l[l.len() - s.len()..] == s[..]
}
