#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency resolution for pakt
//!
//! Turns a set of requested package references into a graph of resolved
//! identities with on-disk directories: override lookup first, then
//! version selection against remote metadata, fetch-or-cache, and
//! recursive expansion of declared dependencies with cycle and conflict
//! detection. Resolution is deterministic: dependencies are visited in
//! declaration order.

mod metadata;
mod resolver;

pub use metadata::PackageMetadata;
pub use resolver::Resolver;

use pakt_types::PackageId;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// A resolved package: its local directory and direct dependencies
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Directory holding the package's file tree
    pub directory: PathBuf,
    /// Identities this package directly requires
    pub dependencies: BTreeSet<PackageId>,
}

/// Result of a resolution session
#[derive(Clone, Debug, Default)]
pub struct ResolutionResult {
    /// All resolved packages, keyed by identity
    pub nodes: HashMap<PackageId, ResolvedPackage>,
    /// Identities the requested references resolved to, in request order
    pub roots: Vec<PackageId>,
}

impl ResolutionResult {
    /// Resolved package for an identity
    #[must_use]
    pub fn get(&self, id: &PackageId) -> Option<&ResolvedPackage> {
        self.nodes.get(id)
    }

    /// All identities in deterministic (sorted) order
    #[must_use]
    pub fn package_ids(&self) -> Vec<&PackageId> {
        let mut ids: Vec<_> = self.nodes.keys().collect();
        ids.sort();
        ids
    }
}
