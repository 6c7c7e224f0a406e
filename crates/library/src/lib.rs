//! Drop-folder ingestion and artifact publishing.
//!
//! Ingestion reconciles every `{ISBN}.zip` archive in the drop directory
//! against the content store: new titles are imported, complete ones are
//! replaced, interrupted ones are rebuilt, and anything that fails is moved
//! to quarantine. Publishing packs a title's container tree into an EPUB
//! and hands it to the distributor's pickup directory under a bumped
//! version.
//!
//! Both sides share one [`Context`], whose [`TitleLocks`] keep them from
//! working on the same title at once.

mod chapter;
pub mod context;
pub mod error;
mod fs;
pub mod import;
pub mod ingest;
mod lock;
pub mod publish;
mod quarantine;
pub mod records;
pub mod scan;
mod status;
#[cfg(test)]
mod testing;

pub use crate::chapter::resolve_chapter_folder;
pub use crate::context::ProcessContext;
pub use crate::lock::{TitleGuard, TitleLocks};
pub use crate::quarantine::{QUARANTINE_DIR, quarantine};
pub use crate::status::{TitleStatus, title_status};

use crate::import::{ArchiveImporter, ZipImporter};
use bestpub_config::{Config, IngestionConfig, PublishingConfig};
use bestpub_model::Isbn;
use bestpub_store::error::Result as StoreResult;
use bestpub_store::{NodeKind, NodeRef, StoreHandle};
use std::sync::Arc;

/// Everything ingestion and publishing need, shared between them.
#[derive(Clone)]
pub struct Context {
    pub store: StoreHandle,
    pub importer: Arc<dyn ArchiveImporter>,
    pub locks: TitleLocks,
    pub ingestion: IngestionConfig,
    pub publishing: PublishingConfig,
}

impl Context {
    /// A context importing with a [`ZipImporter`] for the configured
    /// chapter convention.
    pub fn new(store: StoreHandle, config: &Config) -> Self {
        Self {
            store,
            importer: Arc::new(ZipImporter::new(config.ingestion.chapter_convention)),
            locks: TitleLocks::new(),
            ingestion: config.ingestion.clone(),
            publishing: config.publishing.clone(),
        }
    }

    pub fn with_importer(mut self, importer: impl ArchiveImporter + 'static) -> Self {
        self.importer = Arc::new(importer);
        self
    }

    /// The title container for `isbn`, if one has been imported.
    pub async fn title(&self, isbn: &Isbn) -> StoreResult<Option<NodeRef>> {
        match self.store.resolve(&self.ingestion.titles_path).await? {
            Some(container) => self.store.child_by_name(container, isbn.as_str()).await,
            None => Ok(None),
        }
    }

    /// The node holding what was last published for `isbn`, if it has ever
    /// been published. It lives outside the title container, so replacing a
    /// title on re-ingestion keeps it.
    pub async fn publish_record(&self, isbn: &Isbn) -> StoreResult<Option<NodeRef>> {
        match self.store.resolve(&self.publishing.records_path).await? {
            Some(container) => self.store.child_by_name(container, isbn.as_str()).await,
            None => Ok(None),
        }
    }

    /// [`Context::publish_record`], creating the node if needed.
    pub(crate) async fn ensure_publish_record(&self, isbn: &Isbn) -> StoreResult<NodeRef> {
        let container = self.store.ensure_path(&self.publishing.records_path).await?;
        match self.store.child_by_name(container, isbn.as_str()).await? {
            Some(record) => Ok(record),
            None => self.store.create_node(container, isbn.as_str(), NodeKind::Folder).await,
        }
    }
}
