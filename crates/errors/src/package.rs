//! Package resolution error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PackageError {
    #[error("invalid package reference: {input}")]
    InvalidReference { input: String },

    #[error("no version of {path} matches {range}")]
    NoMatchingVersion { path: String, range: String },

    #[error("version conflict on {path}: {details}")]
    VersionConflict { path: String, details: String },

    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}
