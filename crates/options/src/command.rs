//! Rendering aggregated options into argument lists
//!
//! Compiler and linker rendering are deliberately asymmetric: the
//! compiler's `add_everything` emits a complete argument list, while the
//! linker's emits raw flags only and the link step must gather
//! directories and libraries through the explicit queries. A consumer
//! assuming symmetry would silently drop libraries from the link line.

use crate::compiler::{DefinitionValue, NativeCompilerOptions};
use crate::linker::NativeLinkerOptions;
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// An argument list under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
}

impl Command {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}

/// Forward-slash path form with no trailing separator.
///
/// Idempotent: normalizing an already-normalized string returns it
/// unchanged.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/");
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}

impl NativeCompilerOptions {
    /// Definitions then include directories, system scope before own
    /// scope throughout.
    pub fn add_definitions_and_include_directories(&self, cmd: &mut Command) {
        for scope in [&self.system, &self.own] {
            for (key, value) in &scope.definitions {
                match value {
                    DefinitionValue::Empty => cmd.push(format!("-D{key}")),
                    DefinitionValue::Value(v) => cmd.push(format!("-D{key}={v}")),
                }
            }
        }
        for scope in [&self.system, &self.own] {
            for dir in scope.include_directories.gather() {
                cmd.push(format!("-I{}", normalize_path(&dir)));
            }
        }
    }

    /// The complete compile argument list: definitions, include
    /// directories, then raw flags verbatim (system scope first).
    pub fn add_everything(&self, cmd: &mut Command) {
        self.add_definitions_and_include_directories(cmd);
        for scope in [&self.system, &self.own] {
            for flag in &scope.compile_flags {
                cmd.push(flag.clone());
            }
        }
    }
}

impl NativeLinkerOptions {
    /// Raw link flags only, system scope then own, verbatim.
    ///
    /// Directories and libraries are intentionally absent here; see the
    /// gather queries.
    pub fn add_everything(&self, cmd: &mut Command) {
        for scope in [&self.system, &self.own] {
            for flag in &scope.link_flags {
                cmd.push(flag.clone());
            }
        }
    }

    /// Deduplicated link-search directories, system tiers before own
    #[must_use]
    pub fn gather_link_directories(&self) -> Vec<PathBuf> {
        let mut seen: IndexSet<PathBuf> = IndexSet::new();
        seen.extend(self.system.link_directories.gather());
        seen.extend(self.own.link_directories.gather());
        seen.into_iter().collect()
    }

    /// All link libraries in order, duplicates retained
    #[must_use]
    pub fn gather_link_libraries(&self) -> Vec<String> {
        let mut libraries = self.system.link_libraries.clone();
        libraries.extend(self.own.link_libraries.iter().cloned());
        libraries
    }
}
