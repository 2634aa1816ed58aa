#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Source descriptors for pakt
//!
//! A [`Source`] describes where and how to fetch a package's file tree:
//! one of the supported version-control systems, a single remote file, or
//! a set of remote files. Sources are value objects with a canonical
//! printed form; the cache key for a fetched tree is a hash of that form.

mod fetch;
mod template;
mod validate;

pub use template::apply_version_to_url;

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

fn default_revision() -> i64 {
    -1
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_default_revision(rev: &i64) -> bool {
    *rev == -1
}

fn is_empty(s: &String) -> bool {
    s.is_empty()
}

/// Tagged descriptor of where/how to fetch a package's file tree.
///
/// Exactly one variant is active at a time. Equality is structural per
/// variant; two sources built independently from the same fields are equal
/// and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    /// The identity variant: always valid, never downloads.
    Empty,
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        branch: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        commit: String,
    },
    Hg {
        url: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        branch: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        commit: String,
        #[serde(default = "default_revision", skip_serializing_if = "is_default_revision")]
        revision: i64,
    },
    Bzr {
        url: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default = "default_revision", skip_serializing_if = "is_default_revision")]
        revision: i64,
    },
    Fossil {
        url: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        branch: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        commit: String,
    },
    Cvs {
        url: String,
        module: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        branch: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        revision: String,
    },
    Svn {
        url: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        tag: String,
        #[serde(default, skip_serializing_if = "is_empty")]
        branch: String,
        #[serde(default = "default_revision", skip_serializing_if = "is_default_revision")]
        revision: i64,
    },
    #[serde(rename = "remote")]
    RemoteFile { url: String },
    #[serde(rename = "files")]
    RemoteFiles { urls: BTreeSet<String> },
}

impl Default for Source {
    fn default() -> Self {
        Self::Empty
    }
}

impl Source {
    /// Short kind name, also used as the serialization tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Git { .. } => "git",
            Self::Hg { .. } => "hg",
            Self::Bzr { .. } => "bzr",
            Self::Fossil { .. } => "fossil",
            Self::Cvs { .. } => "cvs",
            Self::Svn { .. } => "svn",
            Self::RemoteFile { .. } => "remote",
            Self::RemoteFiles { .. } => "files",
        }
    }

    /// Canonical human-readable form.
    ///
    /// A pure function of the variant's fields: unset fields are omitted,
    /// so construction and serialization history never show through. The
    /// empty source prints as the empty string.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::new();
        let mut field = |k: &str, v: &str| {
            if !v.is_empty() {
                let _ = writeln!(out, "{k}: {v}");
            }
        };

        match self {
            Self::Empty => {}
            Self::Git {
                url,
                tag,
                branch,
                commit,
            }
            | Self::Fossil {
                url,
                tag,
                branch,
                commit,
            } => {
                field("kind", self.kind());
                field("url", url);
                field("tag", tag);
                field("branch", branch);
                field("commit", commit);
            }
            Self::Hg {
                url,
                tag,
                branch,
                commit,
                revision,
            } => {
                field("kind", self.kind());
                field("url", url);
                field("tag", tag);
                field("branch", branch);
                field("commit", commit);
                if *revision != -1 {
                    field("revision", &revision.to_string());
                }
            }
            Self::Bzr { url, tag, revision } => {
                field("kind", self.kind());
                field("url", url);
                field("tag", tag);
                if *revision != -1 {
                    field("revision", &revision.to_string());
                }
            }
            Self::Cvs {
                url,
                module,
                tag,
                branch,
                revision,
            } => {
                field("kind", self.kind());
                field("url", url);
                field("module", module);
                field("tag", tag);
                field("branch", branch);
                field("revision", revision);
            }
            Self::Svn {
                url,
                tag,
                branch,
                revision,
            } => {
                field("kind", self.kind());
                field("url", url);
                field("tag", tag);
                field("branch", branch);
                if *revision != -1 {
                    field("revision", &revision.to_string());
                }
            }
            Self::RemoteFile { url } => {
                field("kind", self.kind());
                field("url", url);
            }
            Self::RemoteFiles { urls } => {
                field("kind", self.kind());
                for url in urls {
                    field("url", url);
                }
            }
        }
        out
    }

    /// Stable cache key: blake3 of the canonical printed form.
    ///
    /// Structurally equal sources hash identically across runs and
    /// platforms; the kind line keeps different variants with overlapping
    /// field sets apart.
    #[must_use]
    pub fn source_hash(&self) -> String {
        blake3::hash(self.print().as_bytes()).to_hex().to_string()
    }

    /// Return a new source with version placeholders substituted.
    ///
    /// `{v}` expands to the full version, `{M}`/`{m}`/`{p}` to its parts.
    /// Substitution applies to urls and tags; non-templated sources come
    /// back unchanged.
    #[must_use]
    pub fn apply_version(&self, v: &Version) -> Self {
        let sub = |s: &String| template::apply_version_to_url(s, v);
        match self.clone() {
            Self::Empty => Self::Empty,
            Self::Git {
                url,
                tag,
                branch,
                commit,
            } => Self::Git {
                url: sub(&url),
                tag: sub(&tag),
                branch,
                commit,
            },
            Self::Hg {
                url,
                tag,
                branch,
                commit,
                revision,
            } => Self::Hg {
                url: sub(&url),
                tag: sub(&tag),
                branch,
                commit,
                revision,
            },
            Self::Bzr { url, tag, revision } => Self::Bzr {
                url: sub(&url),
                tag: sub(&tag),
                revision,
            },
            Self::Fossil {
                url,
                tag,
                branch,
                commit,
            } => Self::Fossil {
                url: sub(&url),
                tag: sub(&tag),
                branch,
                commit,
            },
            Self::Cvs {
                url,
                module,
                tag,
                branch,
                revision,
            } => Self::Cvs {
                url: sub(&url),
                module,
                tag: sub(&tag),
                branch,
                revision,
            },
            Self::Svn {
                url,
                tag,
                branch,
                revision,
            } => Self::Svn {
                url: sub(&url),
                tag: sub(&tag),
                branch,
                revision,
            },
            Self::RemoteFile { url } => Self::RemoteFile { url: sub(&url) },
            Self::RemoteFiles { urls } => Self::RemoteFiles {
                urls: urls.iter().map(sub).collect(),
            },
        }
    }
}
