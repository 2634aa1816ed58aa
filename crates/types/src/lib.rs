#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core value types for pakt
//!
//! Package paths, version constraints and package identities. All types
//! here are immutable value objects created during parsing.

pub mod package;
pub mod path;
pub mod version;

pub use package::{PackageId, UnresolvedPackage};
pub use path::PackagePath;
pub use version::{select_highest, VersionConstraint, VersionSpec};

/// Re-exported concrete version type
pub use semver::Version;
