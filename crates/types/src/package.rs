//! Package references and identities

use crate::{PackagePath, VersionSpec};
use pakt_errors::PackageError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A package path plus a version range, not yet matched to a concrete
/// version. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnresolvedPackage {
    pub path: PackagePath,
    pub range: VersionSpec,
}

impl UnresolvedPackage {
    #[must_use]
    pub fn new(path: PackagePath, range: VersionSpec) -> Self {
        Self { path, range }
    }

    /// Reference to a path at any version
    #[must_use]
    pub fn any(path: PackagePath) -> Self {
        Self {
            path,
            range: VersionSpec::any(),
        }
    }
}

impl FromStr for UnresolvedPackage {
    type Err = PackageError;

    /// Parse a textual package reference.
    ///
    /// `"<path>"` resolves at an implicit any-range; `"<path>-<version>"`
    /// pins an exact version and `"<path>-<range>"` a constraint set. The
    /// split point is the last `-` whose suffix parses as a version or
    /// range, so prerelease versions like `tools/foo-1.0.0-rc.1` work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || PackageError::InvalidReference {
            input: s.to_string(),
        };

        for (pos, _) in s.rmatch_indices('-') {
            let (path_part, version_part) = (&s[..pos], &s[pos + 1..]);
            if let Ok(version) = Version::parse(version_part) {
                let path = path_part.parse().map_err(|_| invalid())?;
                return Ok(Self::new(path, VersionSpec::exact(version)));
            }
            if version_part.starts_with(['=', '>', '<', '!', '~', '*']) {
                let range: VersionSpec = version_part.parse().map_err(|_| invalid())?;
                let path = path_part.parse().map_err(|_| invalid())?;
                return Ok(Self::new(path, range));
            }
        }

        Ok(Self::any(s.parse().map_err(|_| invalid())?))
    }
}

impl fmt::Display for UnresolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.range.is_any() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}-{}", self.path, self.range)
        }
    }
}

/// A fully resolved package identity: path plus exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    pub path: PackagePath,
    pub version: Version,
}

impl PackageId {
    #[must_use]
    pub fn new(path: PackagePath, version: Version) -> Self {
        Self { path, version }
    }

    /// The unresolved reference pinned to this identity
    #[must_use]
    pub fn as_unresolved(&self) -> UnresolvedPackage {
        UnresolvedPackage::new(self.path.clone(), VersionSpec::exact(self.version.clone()))
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.path, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_path() {
        let p: UnresolvedPackage = "org/net/curl".parse().unwrap();
        assert_eq!(p.path.to_string(), "org/net/curl");
        assert!(p.range.is_any());
    }

    #[test]
    fn parse_exact_version() {
        let p: UnresolvedPackage = "org/net/curl-8.5.0".parse().unwrap();
        assert_eq!(p.path.to_string(), "org/net/curl");
        assert_eq!(
            p.range.as_exact(),
            Some(&Version::parse("8.5.0").unwrap())
        );
    }

    #[test]
    fn parse_prerelease_version() {
        let p: UnresolvedPackage = "tools/foo-1.0.0-rc.1".parse().unwrap();
        assert_eq!(p.path.to_string(), "tools/foo");
        assert_eq!(
            p.range.as_exact(),
            Some(&Version::parse("1.0.0-rc.1").unwrap())
        );
    }

    #[test]
    fn parse_range_reference() {
        let p: UnresolvedPackage = "org/zlib->=1.2.0,<2.0.0".parse().unwrap();
        assert_eq!(p.path.to_string(), "org/zlib");
        assert!(p.range.matches(&Version::parse("1.3.0").unwrap()));
        assert!(!p.range.matches(&Version::parse("2.0.0").unwrap()));
    }

    #[test]
    fn dashed_path_without_version() {
        let p: UnresolvedPackage = "org/pkg-config".parse().unwrap();
        assert_eq!(p.path.to_string(), "org/pkg-config");
        assert!(p.range.is_any());
    }

    #[test]
    fn malformed_references_fail() {
        assert!("".parse::<UnresolvedPackage>().is_err());
        assert!("org//x-1.0.0".parse::<UnresolvedPackage>().is_err());
    }

    #[test]
    fn references_work_in_hashed_and_ordered_collections() {
        use std::collections::{BTreeSet, HashSet};

        let a: UnresolvedPackage = "org/zlib->=1.2.0".parse().unwrap();
        let b: UnresolvedPackage = "org/zlib->=1.2.0".parse().unwrap();
        let c: UnresolvedPackage = "org/curl-8.5.0".parse().unwrap();

        let hashed: HashSet<UnresolvedPackage> = [a.clone(), b.clone(), c.clone()].into();
        assert_eq!(hashed.len(), 2);

        let ordered: BTreeSet<UnresolvedPackage> = [a, b, c].into();
        assert_eq!(ordered.len(), 2);
        assert_eq!(
            ordered.iter().next().unwrap().path.to_string(),
            "org/curl"
        );
    }

    #[test]
    fn package_id_equality_and_display() {
        let path: PackagePath = "org/curl".parse().unwrap();
        let a = PackageId::new(path.clone(), Version::parse("1.0.0").unwrap());
        let b = PackageId::new(path.clone(), Version::parse("1.0.0").unwrap());
        let c = PackageId::new(path, Version::parse("1.0.1").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "org/curl-1.0.0");
    }
}
