//! Archive unpacking for downloaded source trees
//!
//! Supports plain tar plus zstd and gzip compressed tarballs.

use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use pakt_errors::{Error, SourceError};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, BufReader};

enum Compression {
    None,
    Zstd,
    Gzip,
}

fn detect(file: &Path) -> Option<Compression> {
    let name = file.file_name()?.to_str()?;
    if name.ends_with(".tar") {
        Some(Compression::None)
    } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
        Some(Compression::Zstd)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(Compression::Gzip)
    } else {
        None
    }
}

/// Whether the file name is a recognized archive format
#[must_use]
pub fn is_archive(file: &Path) -> bool {
    detect(file).is_some()
}

/// Unpack a tar archive (optionally compressed) into `dest`.
///
/// # Errors
///
/// Returns `SourceError::UnsupportedArchive` for unrecognized formats and
/// I/O errors for extraction failures. Entries with parent-dir components
/// are rejected.
pub async fn unpack_archive(file: &Path, dest: &Path) -> Result<(), Error> {
    let compression = detect(file).ok_or_else(|| SourceError::UnsupportedArchive {
        file: file.display().to_string(),
    })?;

    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    // Decompress to a plain tar next to the destination, then extract
    // with blocking tar (the tar crate is synchronous).
    let tar_path = match compression {
        Compression::None => file.to_path_buf(),
        Compression::Zstd | Compression::Gzip => {
            let tmp = dest.with_extension("decompress.tar");
            let input = tokio::fs::File::open(file)
                .await
                .map_err(|e| Error::io_with_path(&e, file))?;
            let reader = BufReader::new(input);
            match compression {
                Compression::Zstd => decompress(ZstdDecoder::new(reader), &tmp).await?,
                _ => decompress(GzipDecoder::new(reader), &tmp).await?,
            }
            tmp
        }
    };

    let result = extract_tar(&tar_path, dest).await;
    if tar_path != file {
        let _ = tokio::fs::remove_file(&tar_path).await;
    }
    result
}

async fn decompress<R: AsyncRead + Unpin>(mut decoder: R, out: &Path) -> Result<(), Error> {
    let mut output = tokio::fs::File::create(out)
        .await
        .map_err(|e| Error::io_with_path(&e, out))?;
    tokio::io::copy(&mut decoder, &mut output).await?;
    Ok(())
}

async fn extract_tar(tar_path: &Path, dest: &Path) -> Result<(), Error> {
    let tar_path = tar_path.to_path_buf();
    let dest: PathBuf = dest.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&tar_path)?;
        let mut archive = tar::Archive::new(file);
        archive.set_unpack_xattrs(false);

        for entry in archive.entries()? {
            let mut entry = entry?;
            let path = entry.path()?;
            if path
                .components()
                .any(|c| c == std::path::Component::ParentDir)
            {
                return Err(SourceError::UnsupportedArchive {
                    file: "archive contains path traversal".to_string(),
                }
                .into());
            }
            entry.unpack_in(&dest)?;
        }

        Ok::<(), Error>(())
    })
    .await
    .map_err(|e| Error::internal(format!("extract task failed: {e}")))??;

    Ok(())
}
