//! Package manifest error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    #[error("manifest not found in {dir}")]
    NotFound { dir: String },

    #[error("invalid manifest: {message}")]
    Invalid { message: String },
}
