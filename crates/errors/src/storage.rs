//! Cache and override store error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("cache entry corrupted: {key}")]
    CorruptedEntry { key: String },

    #[error("override not found: {entry}")]
    OverrideNotFound { entry: String },

    #[error("storage I/O error: {message}")]
    IoError { message: String },
}
