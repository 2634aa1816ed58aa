//! Scope propagation across a dependency chain
//!
//! Exercises the full option bags the way a target-graph walk would:
//! merge a dependency into its consumer, then the consumer into a
//! further consumer, and render commands at each step.

use pakt_options::{Command, GroupSettings, NativeOptions};
use std::path::PathBuf;

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn private_include_paths_terminate_at_the_direct_consumer() {
    // d exports a pre-tier include directory.
    let mut d = NativeOptions::default();
    d.compiler.own.include_directories.pre.insert(p("/pre"));

    // a consumes d privately: the directory flattens into a's terminal
    // scope.
    let mut a = NativeOptions::default();
    a.merge(&d, GroupSettings::system_scope());

    let mut compile_a = Command::new();
    a.compiler.add_definitions_and_include_directories(&mut compile_a);
    assert_eq!(compile_a.args(), ["-I/pre"]);

    // b consumes a publicly; d's directory must not reach b in any tier.
    let mut b = NativeOptions::default();
    b.merge(&a, GroupSettings::own_scope());

    assert!(!b.compiler.own.include_directories.pre.contains(&p("/pre")));
    assert!(b.compiler.own.include_directories.is_empty());
    assert!(b.compiler.system.include_directories.is_empty());

    let mut compile_b = Command::new();
    b.compiler.add_definitions_and_include_directories(&mut compile_b);
    assert!(compile_b.args().is_empty());
}

#[test]
fn public_include_paths_keep_their_tier_through_the_chain() {
    let mut d = NativeOptions::default();
    d.compiler.own.include_directories.pre.insert(p("/pre"));

    let mut a = NativeOptions::default();
    a.merge(&d, GroupSettings::own_scope());
    let mut b = NativeOptions::default();
    b.merge(&a, GroupSettings::own_scope());

    assert!(b.compiler.own.include_directories.pre.contains(&p("/pre")));
}

#[test]
fn compiler_and_linker_sides_do_not_cross_talk() {
    let mut d = NativeOptions::default();
    d.compiler.own.include_directories.normal.insert(p("/inc"));
    d.linker.own.link_directories.normal.insert(p("/lib"));
    d.linker.own.link_libraries.push("z".to_string());

    let mut a = NativeOptions::default();
    a.merge(&d, GroupSettings::own_scope());

    assert!(a.compiler.own.include_directories.normal.contains(&p("/inc")));
    assert!(!a.compiler.own.include_directories.normal.contains(&p("/lib")));
    assert_eq!(a.linker.gather_link_directories(), vec![p("/lib")]);
    assert_eq!(a.linker.gather_link_libraries(), vec!["z"]);
}

#[test]
fn repeated_private_merges_accumulate_in_the_terminal_bag() {
    let mut d1 = NativeOptions::default();
    d1.compiler.own.add_definition("FIRST=1");
    let mut d2 = NativeOptions::default();
    d2.compiler.own.add_definition("FIRST=2");
    d2.compiler.own.add_definition("SECOND");

    let mut a = NativeOptions::default();
    a.merge(&d1, GroupSettings::system_scope());
    a.merge(&d2, GroupSettings::system_scope());

    let mut cmd = Command::new();
    a.compiler.add_definitions_and_include_directories(&mut cmd);
    // First writer wins for FIRST; declaration order preserved.
    assert_eq!(cmd.args(), ["-DFIRST=1", "-DSECOND"]);
}
