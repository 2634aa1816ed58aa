#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package manifest handling for pakt
//!
//! A package root carries a `pakt.toml` describing the package, its
//! declared dependencies (as textual references) and optionally the
//! source it was fetched from. The resolver reads manifests of fetched
//! trees to discover transitive dependencies; the override store reads
//! them to learn which packages a local directory provides.

use pakt_errors::{Error, ManifestError};
use pakt_source::Source;
use pakt_types::{PackageId, UnresolvedPackage, Version};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MANIFEST_FILE: &str = "pakt.toml";

/// Package manifest (pakt.toml contents)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared dependencies as package references. Serialized first so
    /// the array lands above `[package]` rather than inside it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    pub package: PackageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

/// Package information section
///
/// Unknown keys are rejected: a `dependencies` array written below
/// `[package]` lands in this table, and silently dropping it would
/// prune the package's whole subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageInfo {
    pub path: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Manifest {
    /// Load a manifest from a package directory.
    ///
    /// # Errors
    ///
    /// `ManifestError::NotFound` if the directory has no manifest file,
    /// `ManifestError::Invalid` on parse failure.
    pub async fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&path).await.map_err(|_| {
            Error::from(ManifestError::NotFound {
                dir: dir.display().to_string(),
            })
        })?;
        Self::from_toml(&content)
    }

    /// Save the manifest into a package directory.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from writing the file.
    pub async fn save(&self, dir: &Path) -> Result<(), Error> {
        let path = dir.join(MANIFEST_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| ManifestError::Invalid {
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        Ok(())
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// `ManifestError::Invalid` on malformed TOML or fields.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let manifest: Self = toml::from_str(content).map_err(|e| ManifestError::Invalid {
            message: e.to_string(),
        })?;
        // Fail fast on malformed identity fields.
        manifest.package_id()?;
        Ok(manifest)
    }

    /// The package identity declared by this manifest.
    ///
    /// # Errors
    ///
    /// Returns an error when the path or version fields are malformed.
    pub fn package_id(&self) -> Result<PackageId, Error> {
        let path = self.package.path.parse()?;
        let version = Version::parse(&self.package.version)?;
        Ok(PackageId::new(path, version))
    }

    /// Parsed declared dependencies, in declaration order.
    ///
    /// # Errors
    ///
    /// `PackageError::InvalidReference` for a malformed reference.
    pub fn declared_dependencies(&self) -> Result<Vec<UnresolvedPackage>, Error> {
        self.dependencies
            .iter()
            .map(|s| s.parse().map_err(Error::from))
            .collect()
    }
}
