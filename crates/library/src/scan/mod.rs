pub mod error;

use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::scan::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Lists the archives waiting in the drop directory `dir`.
///
/// Only regular files directly inside `dir` whose extension matches
/// `extension` (case-insensitively, without the dot) are returned, sorted by
/// path. Subdirectories, including the quarantine directory, are not entered.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Scan>`](LibraryErrorKind::Scan) raised
/// from [`ErrorKind::DirectoryNotFound`] or [`ErrorKind::NotADirectory`]
/// when `dir` is unusable.
pub async fn list_archives(dir: &Path, extension: &str) -> LibraryResult<Vec<PathBuf>> {
    list_archives_inner(dir, extension).await.or_raise(|| LibraryErrorKind::Scan)
}

pub(crate) async fn list_archives_inner(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    match tokio::fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => {},
        Ok(_) => exn::bail!(ErrorKind::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == IoErrorKind::NotFound => {
            exn::bail!(ErrorKind::DirectoryNotFound(dir.to_path_buf()))
        },
        Err(err) => return Err(err).or_raise(|| ErrorKind::Io),
    }

    let mut archives = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.or_raise(|| ErrorKind::Io)?;
    while let Some(entry) = entries.next_entry().await.or_raise(|| ErrorKind::Io)? {
        let path = entry.path();
        if !has_extension(&path, extension) {
            continue;
        }
        // Follows symlinks, unlike `DirEntry::file_type`.
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => archives.push(path),
            Ok(_) => tracing::debug!(path = %path.display(), "Skipping non-file entry"),
            // Removed between listing and inspection.
            Err(err) if err.kind() == IoErrorKind::NotFound => {},
            Err(err) => return Err(err).or_raise(|| ErrorKind::Io),
        }
    }
    archives.sort();
    tracing::debug!(dir = %dir.display(), count = archives.len(), "Listed drop directory");
    Ok(archives)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
