#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration for pakt
//!
//! A `Config` is loaded once at process start (built-in defaults merged
//! with an optional TOML file) and passed by reference to the resolver,
//! store and network layers. There is no global settings state and no
//! lazy initialization.

use pakt_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Storage path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root for the cache and the override store; defaults to the
    /// platform data directory.
    pub storage_dir: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Byte bound for a single download; 0 means unbounded
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_timeout() -> u64 {
    300
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_max_file_size() -> u64 {
    // 1 GiB; a package source tree larger than this is almost always a
    // mistaken reference.
    1024 * 1024 * 1024
}

impl Config {
    /// Load configuration from a TOML file, merged over defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::File` when the file exists but cannot be read or
    /// parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ConfigError::File {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from the given file if it exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Parse errors from an existing file are not swallowed.
    pub async fn load_or_default(path: &Path) -> Result<Self, Error> {
        if tokio::fs::metadata(path).await.is_ok() {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Effective storage root for cache and overrides
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.paths.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pakt")
        })
    }
}
