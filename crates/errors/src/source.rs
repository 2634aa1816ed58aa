//! Source descriptor and fetch error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("invalid source url for {kind} source: {url}")]
    InvalidUrl { kind: String, url: String },

    #[error("invalid {kind} source: {message}")]
    Invalid { kind: String, message: String },

    #[error("download of {url} exceeds size limit of {limit} bytes")]
    SizeLimitExceeded { url: String, limit: u64 },

    #[error("fetch failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("{tool} exited with {status}: {message}")]
    ToolFailed {
        tool: String,
        status: String,
        message: String,
    },

    #[error("unrecognized archive format: {file}")]
    UnsupportedArchive { file: String },
}
