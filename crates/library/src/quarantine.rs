use crate::error::{ErrorKind, Result};
use crate::fs::move_file;
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// Directory, beneath the base directory, that failed inputs are moved to.
pub const QUARANTINE_DIR: &str = "failedProcessing";

/// Moves `file` into `{base}/failedProcessing/`, keeping its name.
///
/// The quarantine directory is created on demand. A file of the same name
/// already in quarantine is replaced. Returns the new path.
#[tracing::instrument(level = "debug", skip_all, fields(file = %file.display()))]
pub async fn quarantine(file: &Path, base: &Path) -> Result<PathBuf> {
    let Some(name) = file.file_name() else {
        exn::bail!(ErrorKind::Quarantine);
    };
    let dir = base.join(QUARANTINE_DIR);
    tokio::fs::create_dir_all(&dir).await.or_raise(|| ErrorKind::Quarantine)?;
    let target = dir.join(name);

    let (from, to) = (file.to_path_buf(), target.clone());
    tokio::task::spawn_blocking(move || move_file(&from, &to))
        .await
        .or_raise(|| ErrorKind::Quarantine)?
        .or_raise(|| ErrorKind::Quarantine)?;
    tracing::warn!(from = %file.display(), to = %target.display(), "Quarantined file");
    Ok(target)
}
