//! Hierarchical package paths
//!
//! A `PackagePath` is a slash-delimited name such as `org/net/curl`.
//! Comparison is exact (no case folding) and ordering is lexicographic
//! by segment.

use pakt_errors::PackageError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Slash-delimited hierarchical package name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackagePath {
    segments: Vec<String>,
}

impl PackagePath {
    /// Build a path from owned segments
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The path segments in order
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append another path, yielding `self/other`
    #[must_use]
    pub fn join(&self, other: &PackagePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Whether `self` is a (non-strict) segment-wise prefix of `other`
    #[must_use]
    pub fn is_prefix_of(&self, other: &PackagePath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl FromStr for PackagePath {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PackageError::InvalidReference {
                input: s.to_string(),
            });
        }
        let segments: Vec<String> = s.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PackageError::InvalidReference {
                input: s.to_string(),
            });
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl Serialize for PackagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PackagePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
