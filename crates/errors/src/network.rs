//! Network error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("request timeout: {url}")]
    Timeout { url: String },

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("rate limited, retry after {seconds} seconds")]
    RateLimited { seconds: u64 },
}

impl NetworkError {
    /// Whether the failure is transient enough to retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ConnectionRefused(_) | Self::DownloadFailed(_)
        )
    }
}
