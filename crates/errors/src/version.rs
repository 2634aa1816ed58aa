//! Version parsing error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum VersionError {
    #[error("version parse error: {message}")]
    ParseError { message: String },

    #[error("invalid version constraint: {input}")]
    InvalidConstraint { input: String },
}
