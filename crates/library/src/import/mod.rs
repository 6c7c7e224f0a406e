mod classify;
pub mod error;
mod zip;

pub use self::classify::{
    ARTWORK_FOLDER, Destination, PACKAGE_DESCRIPTOR, STYLES_FOLDER, SUPPLEMENTARY_FOLDER, classify, mime_type,
};
pub use self::zip::ZipImporter;

use crate::import::error::Result;
use async_trait::async_trait;
use bestpub_model::Isbn;
use bestpub_model::models::ChapterInfo;
use bestpub_store::{ContentStore, NodeRef};
use std::path::Path;

/// What an import left behind in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// The new title container.
    pub title: NodeRef,
    /// One per chapter container created, sorted by number.
    pub chapters: Vec<ChapterInfo>,
    /// Content nodes written.
    pub files: usize,
}

/// Unpacks one delivered archive into a new title container under `target`.
///
/// Implementations either leave a title container whose ingestion status is
/// `Complete` with its full chapter set, or return an error having removed
/// whatever they created. The caller guarantees no container named after
/// `isbn` exists under `target` when this is called.
#[async_trait]
pub trait ArchiveImporter: Send + Sync {
    async fn import(&self, store: &dyn ContentStore, archive: &Path, target: NodeRef, isbn: &Isbn)
    -> Result<ImportSummary>;
}
