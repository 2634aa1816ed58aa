//! Per-variant fetch implementations
//!
//! VCS variants shell out to the corresponding client tool; remote-file
//! variants stream over HTTP with the configured size bound. Validation
//! always runs before any network or process activity.

use crate::Source;
use pakt_errors::{Error, SourceError};
use pakt_net::{download_file, is_archive, unpack_archive, NetClient};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

fn file_name_from_url(url: &str) -> String {
    url.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// Transport failures become `FetchFailed` carrying the offending URL;
/// size-bound violations pass through unchanged.
async fn fetch_url(
    net: &NetClient,
    url: &str,
    file: &Path,
    max_file_size: u64,
) -> Result<(), Error> {
    download_file(net, url, file, max_file_size)
        .await
        .map_err(|e| match e {
            Error::Network(inner) => SourceError::FetchFailed {
                url: url.to_string(),
                message: inner.to_string(),
            }
            .into(),
            other => other,
        })
}

async fn run_tool(tool: &str, args: &[&str], cwd: &Path) -> Result<(), Error> {
    debug!(tool, ?args, "running fetch tool");
    let output = Command::new(tool)
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|e| SourceError::ToolFailed {
            tool: tool.to_string(),
            status: "spawn failed".to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Keep the tail of stderr; clone output can be long.
        let message = stderr
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(SourceError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            message,
        }
        .into());
    }
    Ok(())
}

impl Source {
    /// Fetch this source's file tree into `dest`.
    ///
    /// `max_file_size` bounds HTTP transfers in bytes (0 = unbounded);
    /// VCS transfers are delegated to the client tool. `dest` is created
    /// if missing. The empty source fetches nothing.
    ///
    /// # Errors
    ///
    /// Validation errors surface before any fetch; transport and tool
    /// failures carry the offending URL or tool status.
    pub async fn download(
        &self,
        net: &NetClient,
        dest: &Path,
        max_file_size: u64,
    ) -> Result<(), Error> {
        self.validate()?;

        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        match self {
            Self::Empty => Ok(()),
            Self::Git {
                url,
                tag,
                branch,
                commit,
            } => Self::fetch_git(url, tag, branch, commit, dest).await,
            Self::Hg {
                url,
                tag,
                branch,
                commit,
                revision,
            } => {
                run_tool("hg", &["clone", url, "."], dest).await?;
                let rev = [tag, branch, commit]
                    .into_iter()
                    .find(|s| !s.is_empty())
                    .cloned()
                    .or_else(|| (*revision != -1).then(|| revision.to_string()));
                if let Some(rev) = rev {
                    run_tool("hg", &["update", "-r", &rev], dest).await?;
                }
                Ok(())
            }
            Self::Bzr { url, tag, revision } => {
                let mut args = vec!["branch".to_string(), url.clone(), ".".to_string()];
                if !tag.is_empty() {
                    args.push("-r".to_string());
                    args.push(format!("tag:{tag}"));
                } else if *revision != -1 {
                    args.push("-r".to_string());
                    args.push(revision.to_string());
                }
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                run_tool("bzr", &args, dest).await
            }
            Self::Fossil {
                url,
                tag,
                branch,
                commit,
            } => {
                run_tool("fossil", &["clone", url, "repo.fossil"], dest).await?;
                let mut args = vec!["open", "repo.fossil"];
                let reference = [tag, branch, commit].into_iter().find(|s| !s.is_empty());
                if let Some(r) = reference {
                    args.push(r);
                }
                run_tool("fossil", &args, dest).await
            }
            Self::Cvs {
                url,
                module,
                tag,
                branch,
                revision,
            } => {
                let mut args = vec!["-d", url.as_str(), "checkout", "-d", "."];
                let reference = [tag, branch, revision].into_iter().find(|s| !s.is_empty());
                if let Some(r) = reference {
                    args.push("-r");
                    args.push(r);
                }
                args.push(module);
                run_tool("cvs", &args, dest).await
            }
            Self::Svn {
                url,
                tag,
                branch,
                revision,
            } => {
                // Conventional repository layout: tags/ and branches/
                // siblings of trunk.
                let target = if !tag.is_empty() {
                    format!("{}/tags/{tag}", url.trim_end_matches('/'))
                } else if !branch.is_empty() {
                    format!("{}/branches/{branch}", url.trim_end_matches('/'))
                } else {
                    url.clone()
                };
                let mut args = vec!["checkout", target.as_str(), "."];
                let rev;
                if *revision != -1 {
                    rev = revision.to_string();
                    args.push("-r");
                    args.push(&rev);
                }
                run_tool("svn", &args, dest).await
            }
            Self::RemoteFile { url } => {
                let file = dest.join(file_name_from_url(url));
                fetch_url(net, url, &file, max_file_size).await?;
                if is_archive(&file) {
                    unpack_archive(&file, dest).await?;
                    tokio::fs::remove_file(&file)
                        .await
                        .map_err(|e| Error::io_with_path(&e, &file))?;
                }
                Ok(())
            }
            Self::RemoteFiles { urls } => {
                for url in urls {
                    let file = dest.join(file_name_from_url(url));
                    fetch_url(net, url, &file, max_file_size).await?;
                }
                Ok(())
            }
        }
    }

    async fn fetch_git(
        url: &str,
        tag: &str,
        branch: &str,
        commit: &str,
        dest: &Path,
    ) -> Result<(), Error> {
        if commit.is_empty() {
            let mut args = vec!["clone", "--depth", "1", url, "."];
            let reference = [tag, branch].into_iter().find(|s| !s.is_empty());
            if let Some(r) = reference {
                args.push("--branch");
                args.push(r);
            }
            run_tool("git", &args, dest).await
        } else {
            // A commit cannot be cloned shallowly by name.
            run_tool("git", &["clone", url, "."], dest).await?;
            run_tool("git", &["checkout", commit], dest).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_from_urls() {
        assert_eq!(
            file_name_from_url("https://example.com/dl/pkg-1.0.tar.gz"),
            "pkg-1.0.tar.gz"
        );
        assert_eq!(file_name_from_url("https://example.com/dl/"), "dl");
    }

    #[tokio::test]
    async fn invalid_source_fails_before_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let net = NetClient::with_defaults().unwrap();
        let src = Source::Git {
            url: "ftp://example.com/r.git".to_string(),
            tag: String::new(),
            branch: String::new(),
            commit: String::new(),
        };
        let err = src.download(&net, tmp.path(), 0).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_fetch_failed() {
        // Bind then drop: the port now refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tmp = tempfile::tempdir().unwrap();
        let net = NetClient::new(pakt_net::NetConfig {
            retry_count: 0,
            retry_delay: std::time::Duration::ZERO,
            ..pakt_net::NetConfig::default()
        })
        .unwrap();
        let src = Source::RemoteFile {
            url: format!("http://{addr}/pkg.txt"),
        };
        let err = src.download(&net, tmp.path(), 0).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Source(SourceError::FetchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn empty_source_downloads_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let net = NetClient::with_defaults().unwrap();
        let dest = tmp.path().join("pkg");
        Source::Empty.download(&net, &dest, 0).await.unwrap();
        assert!(dest.exists());
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0);
    }
}
