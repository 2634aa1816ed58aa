//! Target graph edges
//!
//! A target exclusively owns its outgoing edge set; a resolved edge
//! points back at a target owned elsewhere in the graph. The
//! back-reference is a weak handle with liveness checked at the point of
//! use, never a second owning reference.

use crate::NativeOptions;
use pakt_errors::OptionsError;
use pakt_types::{PackageId, UnresolvedPackage};
use std::sync::{Arc, Weak};

/// A build target: resolved identity plus its option bags
#[derive(Debug)]
pub struct Target {
    pub id: PackageId,
    pub options: NativeOptions,
}

impl Target {
    #[must_use]
    pub fn new(id: PackageId) -> Self {
        Self {
            id,
            options: NativeOptions::default(),
        }
    }
}

/// A dependency edge, either a textual reference awaiting resolution or
/// a handle to a resolved target.
///
/// Resolving an edge produces a new value; an edge is never flipped
/// between states in place. Two resolved edges compare equal iff they
/// reference the same target object, regardless of how each was
/// constructed.
#[derive(Debug, Clone)]
pub enum Dependency {
    Unresolved(UnresolvedPackage),
    Resolved(Weak<Target>),
}

impl Dependency {
    #[must_use]
    pub fn unresolved(package: UnresolvedPackage) -> Self {
        Self::Unresolved(package)
    }

    /// Edge to a resolved target, without taking ownership of it
    #[must_use]
    pub fn resolved(target: &Arc<Target>) -> Self {
        Self::Resolved(Arc::downgrade(target))
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Identity of the referenced target.
    ///
    /// # Errors
    ///
    /// `OptionsError::UnresolvedReference` on an unresolved edge or when
    /// the referenced target has been dropped. Both are contract
    /// violations in the caller and are never coerced to a default.
    pub fn resolved_id(&self) -> Result<PackageId, OptionsError> {
        match self {
            Self::Unresolved(package) => Err(OptionsError::UnresolvedReference {
                package: package.to_string(),
            }),
            Self::Resolved(target) => {
                target
                    .upgrade()
                    .map(|t| t.id.clone())
                    .ok_or_else(|| OptionsError::UnresolvedReference {
                        package: "expired target handle".to_string(),
                    })
            }
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unresolved(a), Self::Unresolved(b)) => a == b,
            // Identity of the referent, not its contents.
            (Self::Resolved(a), Self::Resolved(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Dependency {}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Self::Unresolved(a), Self::Unresolved(b)) => a.cmp(b),
            // Referent identity again: the target's address, not its
            // contents, so ordering agrees with equality.
            (Self::Resolved(a), Self::Resolved(b)) => a.as_ptr().cmp(&b.as_ptr()),
            (Self::Unresolved(_), Self::Resolved(_)) => std::cmp::Ordering::Less,
            (Self::Resolved(_), Self::Unresolved(_)) => std::cmp::Ordering::Greater,
        }
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Insertion-ordered edge set of one target.
///
/// Adding an edge that is already present is a no-op, and iteration
/// follows declaration order so downstream argument lists are
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(Vec<Dependency>);

impl Dependencies {
    /// Add an edge; returns whether it was newly inserted
    pub fn add(&mut self, dependency: Dependency) -> bool {
        if self.0.contains(&dependency) {
            return false;
        }
        self.0.push(dependency);
        true
    }

    #[must_use]
    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.0.contains(dependency)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakt_types::Version;

    fn target(name: &str) -> Arc<Target> {
        Arc::new(Target::new(PackageId::new(
            name.parse().unwrap(),
            Version::parse("1.0.0").unwrap(),
        )))
    }

    #[test]
    fn resolved_edges_compare_by_target_identity() {
        let t = target("org/a");
        let other = target("org/a");

        let e1 = Dependency::resolved(&t);
        let e2 = Dependency::resolved(&t);
        let e3 = Dependency::resolved(&other);

        // Same referent: equal even though constructed independently.
        assert_eq!(e1, e2);
        // Distinct targets with equal contents are different edges.
        assert_ne!(e1, e3);
    }

    #[test]
    fn ordering_agrees_with_identity_equality() {
        use std::collections::BTreeSet;

        let t = target("org/a");
        let other = target("org/a");
        let unresolved = Dependency::unresolved("org/zlib".parse().unwrap());

        // Equal edges compare as equal in the ordering too.
        assert_eq!(
            Dependency::resolved(&t).cmp(&Dependency::resolved(&t)),
            std::cmp::Ordering::Equal
        );
        // Unresolved edges sort before resolved ones.
        assert!(unresolved < Dependency::resolved(&t));

        let set: BTreeSet<Dependency> = [
            Dependency::resolved(&t),
            Dependency::resolved(&t),
            Dependency::resolved(&other),
            unresolved,
        ]
        .into();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn adding_the_same_edge_twice_is_idempotent() {
        let t = target("org/a");
        let mut deps = Dependencies::default();
        assert!(deps.add(Dependency::resolved(&t)));
        assert!(!deps.add(Dependency::resolved(&t)));
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let a = target("org/a");
        let b = target("org/b");
        let mut deps = Dependencies::default();
        deps.add(Dependency::resolved(&b));
        deps.add(Dependency::resolved(&a));

        let ids: Vec<String> = deps
            .iter()
            .map(|d| d.resolved_id().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["org/b-1.0.0", "org/a-1.0.0"]);
    }

    #[test]
    fn unresolved_edge_has_no_identity() {
        let edge = Dependency::unresolved("org/zlib->=1.0.0".parse().unwrap());
        assert!(!edge.is_resolved());
        assert!(matches!(
            edge.resolved_id(),
            Err(OptionsError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn dropped_target_fails_liveness_check() {
        let t = target("org/a");
        let edge = Dependency::resolved(&t);
        drop(t);
        assert!(edge.resolved_id().is_err());
    }
}
