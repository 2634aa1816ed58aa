//! Linker-side option bags

use crate::dependency::Dependencies;
use crate::{DirectoryBuckets, GroupSettings};
use indexmap::IndexSet;

/// Libraries, frameworks, raw link flags and link-directory tiers of one
/// scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkerOptions {
    /// Ordered, never deduplicated: repeated occurrences of a library
    /// can be required to resolve circular symbol references.
    pub link_libraries: Vec<String>,
    pub frameworks: IndexSet<String>,
    pub link_flags: Vec<String>,
    pub link_directories: DirectoryBuckets,
}

impl LinkerOptions {
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        self.link_libraries
            .extend(other.link_libraries.iter().cloned());
        self.frameworks.extend(other.frameworks.iter().cloned());
        self.link_flags.extend(other.link_flags.iter().cloned());
        self.link_directories
            .merge(&other.link_directories, settings);
    }
}

/// Linker options of a target, split into own and system scope, plus the
/// target's outgoing dependency edges.
#[derive(Debug, Clone, Default)]
pub struct NativeLinkerOptions {
    pub own: LinkerOptions,
    pub system: LinkerOptions,
    /// Edges belong to the target that declares them and are never
    /// merged in from a dependency.
    pub dependencies: Dependencies,
}

impl NativeLinkerOptions {
    /// Same scope rule as the compiler side: the dependency's own scope
    /// either keeps propagating through `self`'s interface or terminates
    /// in `self`'s system bag.
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        if settings.merge_to_self {
            self.own.merge(&other.own, settings);
        } else {
            self.system.merge(&other.own, settings);
        }
    }
}
