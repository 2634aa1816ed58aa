//! Structural source validation
//!
//! Validation is purely syntactic and runs before any fetch is attempted;
//! a source that fails here never reaches the network.

use crate::Source;
use pakt_errors::SourceError;
use url::Url;

fn scheme_ok(raw: &str, allowed: &[&str]) -> bool {
    match Url::parse(raw) {
        Ok(u) => allowed.contains(&u.scheme()),
        Err(_) => false,
    }
}

// scp-style remotes (git@host:path) are common for git and hg
fn scp_like(raw: &str) -> bool {
    !raw.contains("://") && raw.contains('@') && raw.contains(':')
}

// cvs roots look like :pserver:user@host:/cvsroot
fn cvs_root_ok(raw: &str) -> bool {
    raw.starts_with(':') && raw.matches(':').count() >= 3
}

impl Source {
    /// Structural URL check without network access
    #[must_use]
    pub fn is_valid_url(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Git { url, .. } | Self::Fossil { url, .. } => {
                scheme_ok(url, &["https", "http", "ssh", "git"]) || scp_like(url)
            }
            Self::Hg { url, .. } => scheme_ok(url, &["https", "http", "ssh"]) || scp_like(url),
            Self::Bzr { url, .. } => scheme_ok(url, &["https", "http", "ssh", "bzr"]),
            Self::Cvs { url, .. } => cvs_root_ok(url),
            Self::Svn { url, .. } => scheme_ok(url, &["https", "http", "svn", "svn+ssh"]),
            Self::RemoteFile { url } => scheme_ok(url, &["https", "http"]),
            Self::RemoteFiles { urls } => {
                !urls.is_empty() && urls.iter().all(|u| scheme_ok(u, &["https", "http"]))
            }
        }
    }

    /// Validate the whole descriptor: URL shape plus per-variant field
    /// constraints.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidUrl` for a malformed URL and
    /// `SourceError::Invalid` for inconsistent fields, before any I/O.
    pub fn validate(&self) -> Result<(), SourceError> {
        if !self.is_valid_url() {
            return Err(SourceError::InvalidUrl {
                kind: self.kind().to_string(),
                url: self.url_for_display(),
            });
        }

        let invalid = |message: &str| {
            Err(SourceError::Invalid {
                kind: self.kind().to_string(),
                message: message.to_string(),
            })
        };

        match self {
            Self::Git {
                tag,
                branch,
                commit,
                ..
            }
            | Self::Fossil {
                tag,
                branch,
                commit,
                ..
            } => {
                let set = [tag, branch, commit].iter().filter(|s| !s.is_empty()).count();
                if set > 1 {
                    return invalid("at most one of tag/branch/commit may be set");
                }
            }
            Self::Hg {
                tag,
                branch,
                commit,
                revision,
                ..
            } => {
                let mut set = [tag, branch, commit].iter().filter(|s| !s.is_empty()).count();
                if *revision != -1 {
                    set += 1;
                }
                if set > 1 {
                    return invalid("at most one of tag/branch/commit/revision may be set");
                }
            }
            Self::Bzr { tag, revision, .. } => {
                if !tag.is_empty() && *revision != -1 {
                    return invalid("at most one of tag/revision may be set");
                }
            }
            Self::Cvs { module, .. } => {
                if module.is_empty() {
                    return invalid("module is required");
                }
            }
            Self::Svn {
                tag,
                branch,
                revision,
                ..
            } => {
                let mut set = [tag, branch].iter().filter(|s| !s.is_empty()).count();
                if *revision != -1 {
                    set += 1;
                }
                if set > 1 {
                    return invalid("at most one of tag/branch/revision may be set");
                }
            }
            Self::Empty | Self::RemoteFile { .. } | Self::RemoteFiles { .. } => {}
        }

        Ok(())
    }

    fn url_for_display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Git { url, .. }
            | Self::Hg { url, .. }
            | Self::Bzr { url, .. }
            | Self::Fossil { url, .. }
            | Self::Cvs { url, .. }
            | Self::Svn { url, .. }
            | Self::RemoteFile { url } => url.clone(),
            Self::RemoteFiles { urls } => urls.iter().next().cloned().unwrap_or_default(),
        }
    }
}
