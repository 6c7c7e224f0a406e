use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::ImportSummary;
use crate::ingest::error::{Error, ErrorKind, Result};
use crate::quarantine::quarantine;
use crate::records;
use bestpub_model::Isbn;
use bestpub_model::models::IngestionStatus;
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// How an archive related to what the content store already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// No title container existed.
    New,
    /// A complete title was deleted and imported again.
    Republish,
    /// An interrupted import was deleted and started over.
    Resume,
}
impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::New => "new",
            Self::Republish => "republish",
            Self::Resume => "resume",
        })
    }
}

/// The result of reconciling one archive. Every variant means the archive
/// has left the drop directory.
#[derive(Debug)]
pub enum Outcome {
    /// The title was imported and the archive deleted.
    Imported { archive: PathBuf, isbn: Isbn, transition: Transition, summary: ImportSummary },
    /// The archive's name is not an ISBN; it was quarantined untouched.
    Rejected { archive: PathBuf, quarantined: PathBuf },
    /// Importing failed; the archive was quarantined.
    Failed { archive: PathBuf, isbn: Isbn, quarantined: PathBuf, error: Error },
}

impl Outcome {
    /// The archive as it was found in the drop directory.
    pub fn archive(&self) -> &Path {
        match self {
            Self::Imported { archive, .. } | Self::Rejected { archive, .. } | Self::Failed { archive, .. } => archive,
        }
    }

    pub fn isbn(&self) -> Option<&Isbn> {
        match self {
            Self::Imported { isbn, .. } | Self::Failed { isbn, .. } => Some(isbn),
            Self::Rejected { .. } => None,
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, Self::Imported { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Reconciles a single archive against the content store.
///
/// The archive's name without its extension is the title key. What happens
/// next depends on the title container found under that key:
///
/// - **absent**: import.
/// - **complete**: delete it, then import ([`Transition::Republish`]).
/// - **in progress, or unreadable status**: a previous import was cut
///   short; delete it, then import ([`Transition::Resume`]).
///
/// On success the archive is deleted. An archive that is not named after an
/// ISBN, or whose import fails, is moved to `failedProcessing/` beside it.
/// The title's lock is held from before the lookup until the import ends.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Ingest>`](LibraryErrorKind::Ingest) only
/// when the archive could not be moved out of the drop directory, either to
/// quarantine or by deletion after a successful import.
pub async fn reconcile_archive(ctx: &Context, archive: &Path) -> LibraryResult<Outcome> {
    reconcile_archive_inner(ctx, archive).await.or_raise(|| LibraryErrorKind::Ingest)
}

#[tracing::instrument(level = "info", skip_all, fields(archive = %archive.display()))]
pub(crate) async fn reconcile_archive_inner(ctx: &Context, archive: &Path) -> Result<Outcome> {
    let base = archive.parent().unwrap_or(&ctx.ingestion.drop_directory);
    let key = archive.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
    let isbn: Isbn = match key.parse() {
        Ok(isbn) => isbn,
        Err(err) => {
            tracing::warn!(error = ?err, "Archive name is not an ISBN");
            let quarantined =
                quarantine(archive, base).await.or_raise(|| ErrorKind::Quarantine(archive.to_path_buf()))?;
            return Ok(Outcome::Rejected { archive: archive.to_path_buf(), quarantined });
        },
    };

    let _guard = ctx.locks.lock(&isbn).await;
    match replace_title(ctx, archive, &isbn).await {
        Ok((transition, summary)) => {
            tokio::fs::remove_file(archive).await.or_raise(|| ErrorKind::Cleanup(archive.to_path_buf()))?;
            tracing::info!(%isbn, %transition, chapters = summary.chapters.len(), "Title reconciled");
            Ok(Outcome::Imported { archive: archive.to_path_buf(), isbn, transition, summary })
        },
        Err(error) => {
            tracing::error!(%isbn, error = ?error, "Reconciliation failed");
            let quarantined =
                quarantine(archive, base).await.or_raise(|| ErrorKind::Quarantine(archive.to_path_buf()))?;
            Ok(Outcome::Failed { archive: archive.to_path_buf(), isbn, quarantined, error })
        },
    }
}

async fn replace_title(ctx: &Context, archive: &Path, isbn: &Isbn) -> Result<(Transition, ImportSummary)> {
    let store = &*ctx.store;
    let container = store.ensure_path(&ctx.ingestion.titles_path).await.or_raise(|| ErrorKind::Store)?;
    let transition = match store.child_by_name(container, isbn.as_str()).await.or_raise(|| ErrorKind::Store)? {
        None => Transition::New,
        Some(existing) => {
            let status = records::read_status(store, existing).await.or_raise(|| ErrorKind::Store)?;
            let transition = match status {
                Some(IngestionStatus::Complete) => Transition::Republish,
                Some(IngestionStatus::InProgress) | None => Transition::Resume,
            };
            tracing::info!(%transition, "Removing previous title container");
            store.delete(existing).await.or_raise(|| ErrorKind::Store)?;
            transition
        },
    };
    let summary = ctx
        .importer
        .import(store, archive, container, isbn)
        .await
        .or_raise(|| ErrorKind::ImportFailed(isbn.clone()))?;
    Ok((transition, summary))
}
