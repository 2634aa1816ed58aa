//! Configuration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("config file error: {path}: {message}")]
    File { path: String, message: String },
}
