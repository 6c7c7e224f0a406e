use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::fs::{move_temp, replace};
use crate::publish::assemble::assemble;
use crate::publish::changes::latest_modification_since;
use crate::publish::error::{ErrorKind, Result};
use crate::records;
use bestpub_model::Isbn;
use bestpub_model::models::{IngestionStatus, PublishRecord, Version};
use bestpub_store::NodeRef;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::UtcDateTime;

/// An artifact handed to the distributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub isbn: Isbn,
    pub version: Version,
    /// `{pickup}/{ISBN}.{ext}`
    pub path: PathBuf,
    pub published_at: UtcDateTime,
    pub size: u64,
}

/// Builds the title's artifact and delivers it to the pickup directory
/// under the next version.
///
/// The artifact is built under a random `.part` name in the temporary
/// directory, moved into the pickup directory under that same name, then
/// renamed to `{ISBN}.{ext}` over any previous delivery. A reader of the
/// pickup directory sees either the old artifact or the new one, never a
/// partial file. The publish record is only updated once the rename has
/// succeeded; if that update fails the previous artifact is put back.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Publish>`](LibraryErrorKind::Publish)
/// raised from the publish [`ErrorKind`]. Nothing is left in the pickup
/// directory and the publish record is unchanged.
pub async fn publish(ctx: &Context, isbn: &Isbn) -> LibraryResult<Delivery> {
    let _guard = ctx.locks.lock(isbn).await;
    publish_locked(ctx, isbn).await.or_raise(|| LibraryErrorKind::Publish)
}

/// [`publish`], reporting success as a flag. Failures are logged.
pub async fn try_publish(ctx: &Context, isbn: &Isbn) -> bool {
    match publish(ctx, isbn).await {
        Ok(_) => true,
        Err(err) => {
            tracing::error!(%isbn, error = ?err, "Publishing failed");
            false
        },
    }
}

/// [`publish`], unless nothing under the title has changed since it was
/// last published. Titles that were never published always are.
pub async fn publish_if_changed(ctx: &Context, isbn: &Isbn) -> LibraryResult<Option<Delivery>> {
    let _guard = ctx.locks.lock(isbn).await;
    let changed = has_changed(ctx, isbn).await.or_raise(|| LibraryErrorKind::Publish)?;
    if !changed {
        tracing::info!(%isbn, "Title unchanged since last publish, skipping");
        return Ok(None);
    }
    publish_locked(ctx, isbn).await.map(Some).or_raise(|| LibraryErrorKind::Publish)
}

async fn title(ctx: &Context, isbn: &Isbn) -> Result<NodeRef> {
    let Some(title) = ctx.title(isbn).await.or_raise(|| ErrorKind::Store)? else {
        exn::bail!(ErrorKind::TitleNotFound(isbn.clone()));
    };
    Ok(title)
}

async fn has_changed(ctx: &Context, isbn: &Isbn) -> Result<bool> {
    let title = title(ctx, isbn).await?;
    let Some(published_at) = last_published(ctx, isbn).await?.published_at else {
        return Ok(true);
    };
    let latest =
        latest_modification_since(&*ctx.store, title, Some(published_at)).await.or_raise(|| ErrorKind::Store)?;
    Ok(latest.is_some())
}

/// What was last published for `isbn`. Titles never published have an
/// empty record.
pub(crate) async fn last_published(ctx: &Context, isbn: &Isbn) -> Result<PublishRecord> {
    let Some(record) = ctx.publish_record(isbn).await.or_raise(|| ErrorKind::Store)? else {
        return Ok(PublishRecord::default());
    };
    records::read_publish(&*ctx.store, record).await.or_raise(|| ErrorKind::InvalidPublishRecord(isbn.clone()))
}

#[tracing::instrument(level = "info", skip(ctx), fields(%isbn))]
async fn publish_locked(ctx: &Context, isbn: &Isbn) -> Result<Delivery> {
    let store = &*ctx.store;
    let title = title(ctx, isbn).await?;
    let status = records::read_status(store, title).await.or_raise(|| ErrorKind::Store)?;
    if status != Some(IngestionStatus::Complete) {
        exn::bail!(ErrorKind::TitleIncomplete(isbn.clone()));
    }
    let previous = last_published(ctx, isbn).await?;
    let version = previous.next_version();
    tracing::debug!(previous = ?previous.version, %version, "Bumping published version");
    let record = ctx.ensure_publish_record(isbn).await.or_raise(|| ErrorKind::Store)?;

    let temp_dir = ctx.publishing.temp_directory.clone().unwrap_or_else(std::env::temp_dir);
    let artifact = assemble(store, title, isbn, ctx.ingestion.chapter_convention, &temp_dir).await?;
    let path = ctx.publishing.pickup_directory.join(format!("{isbn}.{}", ctx.publishing.extension));
    let delivered = deliver(artifact, &path).await?;

    let published_at = UtcDateTime::now();
    if let Err(err) = records::write_publish(store, record, version, published_at).await {
        delivered.roll_back().await;
        return Err(err).or_raise(|| ErrorKind::Store);
    }
    let size = delivered.commit().await;
    tracing::info!(%version, path = %path.display(), size, "Published artifact");
    Ok(Delivery { isbn: isbn.clone(), version, path, published_at, size })
}

/// An artifact renamed into place whose publish record is not written yet.
#[derive(Debug)]
struct Delivered {
    target: PathBuf,
    /// Hard link (or copy) of the artifact `target` replaced, if any.
    previous: Option<PathBuf>,
    size: u64,
}

impl Delivered {
    async fn commit(self) -> u64 {
        if let Some(previous) = &self.previous
            && let Err(err) = tokio::fs::remove_file(previous).await
        {
            tracing::warn!(path = %previous.display(), error = %err, "Could not remove replaced artifact");
        }
        self.size
    }

    /// Put back whatever `target` held before the delivery.
    async fn roll_back(self) {
        let restored = match self.previous {
            Some(previous) => {
                let target = self.target.clone();
                tokio::task::spawn_blocking(move || replace(&previous, &target))
                    .await
                    .unwrap_or_else(|err| Err(std::io::Error::other(err)))
            },
            None => tokio::fs::remove_file(&self.target).await,
        };
        match restored {
            Ok(()) => tracing::warn!(path = %self.target.display(), "Withdrew delivered artifact"),
            Err(err) => {
                tracing::error!(path = %self.target.display(), error = %err, "Could not withdraw delivered artifact")
            },
        }
    }
}

/// Stage `artifact` in the directory of `target`, keep aside whatever
/// `target` currently holds, then rename the artifact over `target`.
async fn deliver(artifact: NamedTempFile, target: &Path) -> Result<Delivered> {
    let target = target.to_path_buf();
    let failed = {
        let target = target.clone();
        move || ErrorKind::PublishDeliveryFailed(target)
    };
    tokio::task::spawn_blocking(move || -> Result<Delivered> {
        let failed = || ErrorKind::PublishDeliveryFailed(target.clone());
        let (Some(pickup), Some(name)) = (target.parent(), artifact.path().file_name()) else {
            exn::bail!(failed());
        };
        let staged = pickup.join(name);
        let size = artifact.as_file().metadata().or_raise(failed)?.len();
        move_temp(artifact, &staged).or_raise(failed)?;

        let previous = if target.exists() {
            tracing::warn!(path = %target.display(), "Replacing previously delivered artifact");
            let previous = staged.with_extension("previous");
            if let Err(err) = keep_aside(&target, &previous) {
                discard(&[staged.as_path()]);
                return Err(err).or_raise(failed);
            }
            Some(previous)
        } else {
            None
        };
        if let Err(err) = replace(&staged, &target) {
            discard(&[staged.as_path()]);
            if let Some(previous) = &previous {
                discard(&[previous.as_path()]);
            }
            return Err(err).or_raise(failed);
        }
        Ok(Delivered { target, previous, size })
    })
    .await
    .or_raise(failed)?
}

fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::error!(path = %path.display(), error = %err, "Could not remove staged artifact");
        }
    }
}

fn keep_aside(target: &Path, aside: &Path) -> std::io::Result<()> {
    match std::fs::hard_link(target, aside) {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::debug!(error = %err, "Hard link refused, copying replaced artifact");
            std::fs::copy(target, aside).map(drop)
        },
    }
}
