//! Filesystem moves that behave the same on one volume or across two.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Suffix of partially written files; never a valid archive or artifact name.
pub(crate) const PARTIAL_SUFFIX: &str = ".part";

/// Rename `from` to `to`, replacing whatever is at `to`.
///
/// POSIX `rename` already replaces the target atomically. Where the platform
/// refuses to, the target is deleted immediately before a second attempt.
pub(crate) fn replace(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if to.exists() && err.kind() != ErrorKind::CrossesDevices => {
            tracing::debug!(to = %to.display(), error = %err, "Rename refused, removing target and retrying");
            fs::remove_file(to)?;
            fs::rename(from, to)
        },
        Err(err) => Err(err),
    }
}

/// Move `from` to `to`, falling back to copy-and-delete across volumes.
///
/// The copy is staged in `to`'s directory under a temporary name and renamed
/// into place, so `to` never exists half-written.
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match replace(from, to) {
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Moving across volumes");
            let staged = copy_beside(from, to)?;
            staged.persist(to).map_err(|err| err.error)?;
            fs::remove_file(from)
        },
        other => other,
    }
}

/// Move a finished temporary file to `to`. Same semantics as [`move_file`].
pub(crate) fn move_temp(temp: NamedTempFile, to: &Path) -> io::Result<()> {
    match temp.persist(to) {
        Ok(_) => Ok(()),
        Err(err) if err.error.kind() == ErrorKind::CrossesDevices => {
            let staged = copy_beside(err.file.path(), to)?;
            staged.persist(to).map_err(|err| err.error)?;
            // Dropping the original temporary file deletes it.
            Ok(())
        },
        Err(err) => Err(err.error),
    }
}

fn copy_beside(from: &Path, to: &Path) -> io::Result<NamedTempFile> {
    let dir = parent_of(to)?;
    let mut staged = Builder::new().prefix(".").suffix(PARTIAL_SUFFIX).tempfile_in(dir)?;
    io::copy(&mut File::open(from)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

fn parent_of(path: &Path) -> io::Result<PathBuf> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(PathBuf::from(".")),
    }
}
