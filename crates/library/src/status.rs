use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::publish::last_published;
use crate::records;
use bestpub_model::Isbn;
use bestpub_model::models::{ChapterRecord, PublishRecord, TitleRecord};
use bestpub_store::NodeKind;
use exn::ResultExt;

/// Everything the content store knows about one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleStatus {
    pub title: TitleRecord,
    /// Sorted by chapter number.
    pub chapters: Vec<ChapterRecord>,
    pub publish: PublishRecord,
}

/// Reads the title, chapter and publish records for `isbn`. Returns `None`
/// if the title has not been imported.
pub async fn title_status(ctx: &Context, isbn: &Isbn) -> Result<Option<TitleStatus>> {
    let store = &*ctx.store;
    let Some(node) = ctx.title(isbn).await.or_raise(|| ErrorKind::Status)? else {
        return Ok(None);
    };
    let title = records::read_title(store, node, isbn).await.or_raise(|| ErrorKind::Status)?;
    let publish = last_published(ctx, isbn).await.or_raise(|| ErrorKind::Status)?;
    let mut chapters = Vec::new();
    for child in store.children(node).await.or_raise(|| ErrorKind::Status)? {
        if child.kind == NodeKind::Chapter {
            let chapter = records::read_chapter(store, &child, ctx.ingestion.chapter_convention)
                .await
                .or_raise(|| ErrorKind::Status)?;
            chapters.push(chapter);
        }
    }
    chapters.sort_by(|a, b| a.info.cmp(&b.info));
    Ok(Some(TitleStatus { title, chapters, publish }))
}
