//! External package-metadata collaborator
//!
//! The remote side knows which versions of a path exist and how to fetch
//! a concrete identity. Failures propagate as resolution failures; the
//! resolver never synthesizes partial answers.

use async_trait::async_trait;
use pakt_errors::Error;
use pakt_source::Source;
use pakt_types::{PackageId, PackagePath, Version};

#[async_trait]
pub trait PackageMetadata: Send + Sync {
    /// All published versions for a path
    async fn available_versions(&self, path: &PackagePath) -> Result<Vec<Version>, Error>;

    /// The source descriptor for a concrete identity
    async fn source_for(&self, id: &PackageId) -> Result<Source, Error>;
}
