//! Build-option graph error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OptionsError {
    /// Querying the resolved identity of a dependency that is still
    /// unresolved, or whose target has been dropped. Always a contract
    /// violation in the caller, never coerced to a default.
    #[error("package is unresolved: {package}")]
    UnresolvedReference { package: String },
}
