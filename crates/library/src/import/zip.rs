use crate::chapter::resolve_chapter_folder;
use crate::import::classify::{Destination, classify, mime_type};
use crate::import::error::{ErrorKind, Result};
use crate::import::{ArchiveImporter, ImportSummary};
use crate::records;
use async_trait::async_trait;
use bestpub_archive::{Entry, read_archive};
use bestpub_model::models::{
    ChapterInfo, ChapterRecord, ChapterStatus, IngestionStatus, MetadataStatus, TitleRecord,
};
use bestpub_model::{ChapterConvention, Isbn, MAX_CHAPTER_NUMBER, MetadataParser, PropertiesParser, TitleMetadata};
use bestpub_store::{ContentStore, NodeKind, NodeRef};
use exn::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Imports `{ISBN}.zip` deliveries.
///
/// The archive may carry a `{ISBN}.txt` metadata file describing the book
/// and its chapters. Without one, the chapter set is derived from the
/// chapter content filenames. Every other file is filed by name:
///
/// | file                          | destination                    |
/// |-------------------------------|--------------------------------|
/// | `package.opf`                 | the title itself               |
/// | chapter content               | its chapter folder             |
/// | `*.css`                       | `Styles`                       |
/// | images                        | `Artwork`                      |
/// | anything else                 | `Supplementary`                |
///
/// Archive folders are flattened; only the file name is kept.
#[derive(Clone)]
pub struct ZipImporter {
    convention: ChapterConvention,
    parser: Arc<dyn MetadataParser>,
}

impl ZipImporter {
    pub fn new(convention: ChapterConvention) -> Self {
        Self { convention, parser: Arc::new(PropertiesParser) }
    }

    /// Use a different metadata file format.
    pub fn with_parser(mut self, parser: impl MetadataParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    fn metadata(&self, isbn: &Isbn, entries: &[Entry]) -> Result<(Option<usize>, TitleMetadata)> {
        let name = format!("{isbn}.txt");
        let Some(index) = entries.iter().position(|entry| entry.file_name().eq_ignore_ascii_case(&name)) else {
            tracing::debug!(%isbn, "No metadata file, deriving chapters from filenames");
            return Ok((None, TitleMetadata::default()));
        };
        let text = String::from_utf8_lossy(&entries[index].data);
        let metadata = self.parser.parse(isbn, &text).or_raise(|| ErrorKind::Metadata(isbn.clone()))?;
        Ok((Some(index), metadata))
    }

    /// Chapters described by the metadata, or else `1..=N` where `N` is the
    /// highest chapter number found among the content filenames.
    fn chapters(&self, metadata: &TitleMetadata, entries: &[Entry]) -> Vec<ChapterRecord> {
        let infos = match metadata.chapters.is_empty() {
            false => metadata.chapters.clone(),
            true => {
                let highest = entries
                    .iter()
                    .map(Entry::file_name)
                    .filter(|name| self.convention.is_chapter_file(name))
                    .filter_map(|name| self.convention.chapter_number(name))
                    .filter(|number| *number <= MAX_CHAPTER_NUMBER)
                    .max()
                    .unwrap_or(0);
                (1..=highest).map(ChapterInfo::new).collect()
            },
        };
        infos
            .into_iter()
            .map(|info| {
                let status = match info.is_described() {
                    true => ChapterStatus::Completed,
                    false => ChapterStatus::Missing,
                };
                ChapterRecord { info, status }
            })
            .collect()
    }

    async fn populate(
        &self,
        store: &dyn ContentStore,
        title: NodeRef,
        isbn: &Isbn,
        entries: Vec<Entry>,
    ) -> Result<ImportSummary> {
        let (metadata_index, metadata) = self.metadata(isbn, &entries)?;
        let chapters = self.chapters(&metadata, &entries);

        let mut record = TitleRecord::new(isbn.clone());
        record.status = Some(IngestionStatus::InProgress);
        record.metadata_status = Some(MetadataStatus::from_chapters(chapters.iter().map(|c| &c.status)));
        record.metadata = metadata.book;
        record.metadata.chapter_count = Some(u32::try_from(chapters.len()).unwrap_or(MAX_CHAPTER_NUMBER));
        records::write_title(store, title, &record).await.or_raise(|| ErrorKind::Store)?;

        for chapter in &chapters {
            let name = self.convention.folder_name(chapter.info.number);
            let node = store.create_node(title, &name, NodeKind::Chapter).await.or_raise(|| ErrorKind::Store)?;
            records::write_chapter(store, node, chapter).await.or_raise(|| ErrorKind::Store)?;
        }

        let mut folders: HashMap<&'static str, NodeRef> = HashMap::new();
        let mut files = 0;
        for (index, entry) in entries.iter().enumerate() {
            if Some(index) == metadata_index {
                continue;
            }
            let name = entry.file_name();
            let parent = match classify(name, self.convention) {
                Destination::Title => title,
                Destination::Chapter => {
                    let folder = resolve_chapter_folder(store, title, name, self.convention)
                        .await
                        .or_raise(|| ErrorKind::Store)?;
                    let Some(folder) = folder else {
                        exn::bail!(ErrorKind::UnresolvedChapter(name.to_string()));
                    };
                    folder
                },
                Destination::Folder(folder) => match folders.get(folder) {
                    Some(node) => *node,
                    None => {
                        let node =
                            store.create_node(title, folder, NodeKind::Folder).await.or_raise(|| ErrorKind::Store)?;
                        folders.insert(folder, node);
                        node
                    },
                },
            };
            if entry.path != name {
                tracing::debug!(path = entry.path, "Flattening archive path");
            }
            store.create_file(parent, name, mime_type(name), &entry.data).await.or_raise(|| ErrorKind::Store)?;
            files += 1;
        }

        records::write_status(store, title, IngestionStatus::Complete).await.or_raise(|| ErrorKind::Store)?;
        Ok(ImportSummary { title, chapters: chapters.into_iter().map(|c| c.info).collect(), files })
    }
}

impl std::fmt::Debug for ZipImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipImporter").field("convention", &self.convention).finish_non_exhaustive()
    }
}

#[async_trait]
impl ArchiveImporter for ZipImporter {
    #[tracing::instrument(level = "info", skip_all, fields(%isbn, archive = %archive.display()))]
    async fn import(
        &self,
        store: &dyn ContentStore,
        archive: &Path,
        target: NodeRef,
        isbn: &Isbn,
    ) -> Result<ImportSummary> {
        let path: PathBuf = archive.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || read_archive(path))
            .await
            .or_raise(|| ErrorKind::Archive)?
            .or_raise(|| ErrorKind::Archive)?;

        let title = store.create_node(target, isbn.as_str(), NodeKind::Title).await.or_raise(|| ErrorKind::Store)?;
        match self.populate(store, title, isbn, entries).await {
            Ok(summary) => {
                tracing::info!(chapters = summary.chapters.len(), files = summary.files, "Imported title");
                Ok(summary)
            },
            Err(err) => {
                if let Err(cleanup) = store.delete(title).await {
                    tracing::error!(error = ?cleanup, "Could not remove partially imported title");
                }
                Err(err)
            },
        }
    }
}
