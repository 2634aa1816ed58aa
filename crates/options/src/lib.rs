#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build-option propagation for pakt
//!
//! Every build target owns a [`NativeOptions`] bag: macro definitions,
//! raw flags, three-tier directory collections and (on the linker side)
//! its outgoing dependency edges. Merging a dependency's options into a
//! consumer follows an explicit scope rule, [`GroupSettings`]: either
//! the dependency's directory tiers survive and keep propagating through
//! further consumers, or they flatten into the consumer's normal bucket
//! and terminate there. [`Command`] renders aggregated options into the
//! final argument lists.

mod command;
mod compiler;
mod dependency;
mod linker;

pub use command::{normalize_path, Command};
pub use compiler::{CompilerOptions, DefinitionValue, NativeCompilerOptions};
pub use dependency::{Dependencies, Dependency, Target};
pub use linker::{LinkerOptions, NativeLinkerOptions};

use indexmap::IndexSet;
use std::path::PathBuf;

/// Scope rule for a single merge step.
///
/// With `merge_to_self` the dependency's pre/normal/post directory tiers
/// land in the consumer's matching tiers and re-propagate when the
/// consumer is itself merged further down; without it all three tiers
/// flatten into the consumer's normal bucket and stop there. The second
/// form is what keeps a dependency's private search paths from leaking
/// across the whole graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSettings {
    pub merge_to_self: bool,
}

impl GroupSettings {
    /// Tier-preserving merge (interface propagation)
    #[must_use]
    pub fn own_scope() -> Self {
        Self {
            merge_to_self: true,
        }
    }

    /// Flattening merge (directories terminate at the consumer)
    #[must_use]
    pub fn system_scope() -> Self {
        Self {
            merge_to_self: false,
        }
    }
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self::own_scope()
    }
}

/// Ordered, deduplicated directories in three search-priority tiers:
/// pre before normal before post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryBuckets {
    pub pre: IndexSet<PathBuf>,
    pub normal: IndexSet<PathBuf>,
    pub post: IndexSet<PathBuf>,
}

impl DirectoryBuckets {
    /// Fold `other`'s tiers into `self` under the scope rule.
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        if settings.merge_to_self {
            self.pre.extend(other.pre.iter().cloned());
            self.normal.extend(other.normal.iter().cloned());
            self.post.extend(other.post.iter().cloned());
        } else {
            // Tier information is destroyed on purpose: the directories
            // stay visible to whoever compiles `self` directly but do not
            // re-propagate as part of `self`'s interface.
            self.normal.extend(other.gather());
        }
    }

    /// Flattened pre, normal, post union in first-seen order
    #[must_use]
    pub fn gather(&self) -> Vec<PathBuf> {
        let mut seen: IndexSet<PathBuf> = IndexSet::new();
        seen.extend(self.pre.iter().cloned());
        seen.extend(self.normal.iter().cloned());
        seen.extend(self.post.iter().cloned());
        seen.into_iter().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.normal.is_empty() && self.post.is_empty()
    }
}

/// Combined compiler and linker option bags of one target
#[derive(Debug, Clone, Default)]
pub struct NativeOptions {
    pub compiler: NativeCompilerOptions,
    pub linker: NativeLinkerOptions,
}

impl NativeOptions {
    /// Merge `other` into `self` under one scope rule: the compiler-side
    /// merge followed by the linker-side merge. `other` is not modified
    /// and there is no cross-talk between the two sides.
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        self.compiler.merge(&other.compiler, settings);
        self.linker.merge(&other.linker, settings);
    }
}
