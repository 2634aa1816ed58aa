//! Size-bounded streaming downloads
//!
//! A download with a nonzero byte bound must fail before writing past the
//! bound; a bound of zero means unbounded. An aborted download leaves no
//! destination file behind.

use crate::NetClient;
use futures::StreamExt;
use pakt_errors::{Error, NetworkError, SourceError};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Download `url` into `dest`, enforcing `max_file_size` bytes (0 = unbounded).
///
/// # Errors
///
/// Returns `SourceError::SizeLimitExceeded` when the advertised or streamed
/// size passes the bound, or a `NetworkError` on transport failure.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    max_file_size: u64,
) -> Result<(), Error> {
    let response = client.get(url).await?;

    // Reject oversized downloads before streaming when the server tells us.
    if max_file_size > 0 {
        if let Some(len) = response.content_length() {
            if len > max_file_size {
                return Err(SourceError::SizeLimitExceeded {
                    url: url.to_string(),
                    limit: max_file_size,
                }
                .into());
            }
        }
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
        if max_file_size > 0 && written + chunk.len() as u64 > max_file_size {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            return Err(SourceError::SizeLimitExceeded {
                url: url.to_string(),
                limit: max_file_size,
            }
            .into());
        }
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    debug!(url, bytes = written, "download complete");
    Ok(())
}
