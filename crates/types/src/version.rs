//! Version constraint parsing and matching
//!
//! Constraint syntax:
//! - `==1.2.3` - Exact version
//! - `>=1.2.0` / `<=2.0.0` / `>1.0.0` / `<2.0.0` - Bounds
//! - `~=1.2.0` - Compatible release (same major.minor, not below)
//! - `!=1.5.0` - Exclude version
//! - Comma-joined conjunction: `>=1.2,<2.0,!=1.5.0`
//! - `*` or empty - Any version

use pakt_errors::VersionError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single version constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VersionConstraint {
    Exact(Version),
    GreaterEqual(Version),
    LessEqual(Version),
    Greater(Version),
    Less(Version),
    Compatible(Version),
    NotEqual(Version),
}

impl VersionConstraint {
    /// Check if a version satisfies this constraint
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Exact(v) => version == v,
            Self::GreaterEqual(v) => version >= v,
            Self::LessEqual(v) => version <= v,
            Self::Greater(v) => version > v,
            Self::Less(v) => version < v,
            Self::NotEqual(v) => version != v,
            Self::Compatible(v) => {
                version >= v && version.major == v.major && version.minor == v.minor
            }
        }
    }

    fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        let parse_version = |v: &str| {
            Version::parse(v.trim()).map_err(|e| VersionError::ParseError {
                message: e.to_string(),
            })
        };

        // Two-character operators must be tried before `>` and `<`.
        if let Some(v) = s.strip_prefix("==") {
            Ok(Self::Exact(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix(">=") {
            Ok(Self::GreaterEqual(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix("<=") {
            Ok(Self::LessEqual(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix("!=") {
            Ok(Self::NotEqual(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix("~=") {
            Ok(Self::Compatible(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix('>') {
            Ok(Self::Greater(parse_version(v)?))
        } else if let Some(v) = s.strip_prefix('<') {
            Ok(Self::Less(parse_version(v)?))
        } else {
            Err(VersionError::InvalidConstraint {
                input: s.to_string(),
            })
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "=={v}"),
            Self::GreaterEqual(v) => write!(f, ">={v}"),
            Self::LessEqual(v) => write!(f, "<={v}"),
            Self::Greater(v) => write!(f, ">{v}"),
            Self::Less(v) => write!(f, "<{v}"),
            Self::Compatible(v) => write!(f, "~={v}"),
            Self::NotEqual(v) => write!(f, "!={v}"),
        }
    }
}

/// A version range: the conjunction of zero or more constraints
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct VersionSpec {
    constraints: Vec<VersionConstraint>,
}

impl VersionSpec {
    /// The unconstrained range matching any version
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A range pinned to exactly one version
    #[must_use]
    pub fn exact(version: Version) -> Self {
        Self {
            constraints: vec![VersionConstraint::Exact(version)],
        }
    }

    /// Check if a version satisfies all constraints
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.constraints.iter().all(|c| c.matches(version))
    }

    #[must_use]
    pub fn constraints(&self) -> &[VersionConstraint] {
        &self.constraints
    }

    /// True when the range carries no constraints at all
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The pinned version, if this range is a single exact constraint
    #[must_use]
    pub fn as_exact(&self) -> Option<&Version> {
        match self.constraints.as_slice() {
            [VersionConstraint::Exact(v)] => Some(v),
            _ => None,
        }
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }

        let constraints = s
            .split(',')
            .map(VersionConstraint::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { constraints })
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "*");
        }
        let strs: Vec<_> = self.constraints.iter().map(ToString::to_string).collect();
        write!(f, "{}", strs.join(","))
    }
}

/// Select the highest candidate satisfying `spec`, if any.
///
/// Resolution candidates are chosen with this single rule everywhere, so
/// the reported result is always the version actually used.
#[must_use]
pub fn select_highest<'a, I>(spec: &VersionSpec, candidates: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    candidates
        .into_iter()
        .filter(|v| spec.matches(v))
        .max()
        .cloned()
}
