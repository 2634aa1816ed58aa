//! Compiler-side option bags

use crate::{DirectoryBuckets, GroupSettings};
use indexmap::IndexMap;

/// A macro definition's right-hand side.
///
/// `Empty` is the "defined without a value" sentinel and renders as a
/// bare `-DKEY`; it is distinct from defining the key to an empty
/// string's worth of nothing at parse time only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefinitionValue {
    #[default]
    Empty,
    Value(String),
}

/// Definitions, raw compile flags and include-directory tiers of one
/// scope.
///
/// Definitions keep insertion order; raw flags keep duplicates and
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub definitions: IndexMap<String, DefinitionValue>,
    pub compile_flags: Vec<String>,
    pub include_directories: DirectoryBuckets,
}

impl CompilerOptions {
    /// Add a definition in `KEY`, `KEY=` or `KEY=value` form.
    ///
    /// An already-present key is left untouched, matching the merge rule:
    /// the first writer wins.
    pub fn add_definition(&mut self, expr: &str) {
        let (key, value) = match expr.split_once('=') {
            Some((key, "")) => (key, DefinitionValue::Empty),
            Some((key, value)) => (key, DefinitionValue::Value(value.to_string())),
            None => (expr, DefinitionValue::Empty),
        };
        self.definitions.entry(key.to_string()).or_insert(value);
    }

    /// Remove a definition by key; `KEY=value` form is accepted and the
    /// value part ignored.
    pub fn remove_definition(&mut self, expr: &str) {
        let key = expr.split_once('=').map_or(expr, |(k, _)| k);
        self.definitions.shift_remove(key);
    }

    /// Merge `other` into `self`: existing definitions win, flags append
    /// in `other`'s declared order after `self`'s own, directory tiers
    /// follow the scope rule.
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        for (key, value) in &other.definitions {
            self.definitions
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self.compile_flags
            .extend(other.compile_flags.iter().cloned());
        self.include_directories
            .merge(&other.include_directories, settings);
    }
}

/// Compiler options of a target, split into the own (interface) scope
/// and the system (terminal) scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeCompilerOptions {
    pub own: CompilerOptions,
    pub system: CompilerOptions,
}

impl NativeCompilerOptions {
    /// Merge a dependency's interface options under the scope rule.
    ///
    /// Only the dependency's own (interface) scope propagates; its system
    /// scope already terminated there. Own-scope merges keep feeding
    /// `self`'s interface, system-scope merges land in `self`'s terminal
    /// bag with their tiers flattened, so a further consumer of `self`
    /// never re-acquires them.
    pub fn merge(&mut self, other: &Self, settings: GroupSettings) {
        if settings.merge_to_self {
            self.own.merge(&other.own, settings);
        } else {
            self.system.merge(&other.own, settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn definition_forms() {
        let mut opts = CompilerOptions::default();
        opts.add_definition("FOO");
        opts.add_definition("BAR=");
        opts.add_definition("BAZ=1");

        assert_eq!(opts.definitions["FOO"], DefinitionValue::Empty);
        assert_eq!(opts.definitions["BAR"], DefinitionValue::Empty);
        assert_eq!(
            opts.definitions["BAZ"],
            DefinitionValue::Value("1".to_string())
        );
    }

    #[test]
    fn first_writer_wins_on_add_and_merge() {
        let mut a = CompilerOptions::default();
        a.add_definition("FOO=1");
        a.add_definition("FOO=2");
        assert_eq!(a.definitions["FOO"], DefinitionValue::Value("1".to_string()));

        let mut b = CompilerOptions::default();
        b.add_definition("FOO=3");
        b.add_definition("NEW=4");
        a.merge(&b, GroupSettings::own_scope());
        assert_eq!(a.definitions["FOO"], DefinitionValue::Value("1".to_string()));
        assert_eq!(a.definitions["NEW"], DefinitionValue::Value("4".to_string()));
    }

    #[test]
    fn remove_accepts_key_and_expr_forms() {
        let mut opts = CompilerOptions::default();
        opts.add_definition("FOO=1");
        opts.remove_definition("FOO=whatever");
        assert!(opts.definitions.is_empty());

        opts.add_definition("BAR");
        opts.remove_definition("BAR");
        assert!(opts.definitions.is_empty());
    }

    #[test]
    fn flags_append_with_duplicates_retained() {
        let mut a = CompilerOptions::default();
        a.compile_flags.push("-O2".to_string());
        let mut b = CompilerOptions::default();
        b.compile_flags.push("-O2".to_string());
        b.compile_flags.push("-g".to_string());

        a.merge(&b, GroupSettings::own_scope());
        assert_eq!(a.compile_flags, vec!["-O2", "-O2", "-g"]);
    }

    #[test]
    fn merge_does_not_modify_source_operand() {
        let mut a = CompilerOptions::default();
        let mut b = CompilerOptions::default();
        b.add_definition("X=1");
        b.include_directories.pre.insert(PathBuf::from("/pre"));

        let before = b.clone();
        a.merge(&b, GroupSettings::system_scope());
        assert_eq!(b, before);
    }

    #[test]
    fn only_the_interface_scope_propagates() {
        let mut a = NativeCompilerOptions::default();
        let mut b = NativeCompilerOptions::default();
        b.own.add_definition("IFACE");
        b.system.add_definition("PRIVATE");

        a.merge(&b, GroupSettings::own_scope());
        assert!(a.own.definitions.contains_key("IFACE"));
        // What already terminated at the dependency stays there.
        assert!(a.system.definitions.is_empty());
        assert!(!a.own.definitions.contains_key("PRIVATE"));
    }

    #[test]
    fn system_scope_merge_lands_in_terminal_bag() {
        let mut a = NativeCompilerOptions::default();
        let mut b = NativeCompilerOptions::default();
        b.own.add_definition("DEP");

        a.merge(&b, GroupSettings::system_scope());
        assert!(a.system.definitions.contains_key("DEP"));
        assert!(a.own.definitions.is_empty());
    }
}
