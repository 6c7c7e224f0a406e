//! Typed access to the properties stored on title and chapter containers.
//!
//! The content store only knows string key/value pairs. Every read and write
//! of those pairs goes through here so the rest of the crate works with
//! [`TitleRecord`], [`ChapterRecord`] and [`PublishRecord`].

use bestpub_model::models::{
    BookMetadata, ChapterInfo, ChapterRecord, ChapterStatus, IngestionStatus, MetadataStatus, PublishRecord,
    TitleRecord, Version,
};
use bestpub_model::{ChapterConvention, Isbn};
use bestpub_store::{ContentStore, Node, NodeRef};
use derive_more::{Display, Error};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcDateTime};

pub const ISBN: &str = "ISBN";
pub const INGESTION_STATUS: &str = "ingestionStatus";
pub const BOOK_TITLE: &str = "bookTitle";
pub const BOOK_GENRE: &str = "bookGenre";
pub const BOOK_AUTHORS: &str = "bookAuthors";
pub const NR_OF_CHAPTERS: &str = "nrOfChapters";
pub const NR_OF_PAGES: &str = "nrOfPages";
pub const BOOK_METADATA_STATUS: &str = "bookMetadataStatus";
pub const CHAPTER_NUMBER: &str = "chapterNumber";
pub const CHAPTER_TITLE: &str = "chapterTitle";
pub const CHAPTER_AUTHOR: &str = "chapterAuthor";
pub const CHAPTER_METADATA_STATUS: &str = "chapterMetadataStatus";
pub const WEB_PUBLISHED_VERSION: &str = "webPublishedVersion";
pub const WEB_PUBLISHED_DATE: &str = "webPublishedDate";

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("content store operation failed")]
    Store,
    /// A stored value that must be understood to carry on could not be.
    #[display("stored property {key} has unreadable value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Read the title container `node`.
///
/// Unreadable optional values are logged and dropped; an unreadable status
/// becomes `None`, which callers treat as an interrupted ingestion.
pub async fn read_title(store: &dyn ContentStore, node: NodeRef, isbn: &Isbn) -> Result<TitleRecord> {
    let props = store.properties(node).await.or_raise(|| ErrorKind::Store)?;
    Ok(TitleRecord {
        isbn: isbn.clone(),
        status: lenient(&props, INGESTION_STATUS),
        metadata_status: lenient(&props, BOOK_METADATA_STATUS),
        metadata: BookMetadata {
            title: props.get(BOOK_TITLE).cloned(),
            genre: props.get(BOOK_GENRE).cloned(),
            authors: props
                .get(BOOK_AUTHORS)
                .map(|authors| authors.split(',').map(str::trim).filter(|a| !a.is_empty()).map(String::from).collect())
                .unwrap_or_default(),
            chapter_count: lenient(&props, NR_OF_CHAPTERS),
            page_count: lenient(&props, NR_OF_PAGES),
        },
    })
}

pub async fn write_title(store: &dyn ContentStore, node: NodeRef, record: &TitleRecord) -> Result<()> {
    let mut props = vec![(ISBN, record.isbn.to_string())];
    if let Some(status) = record.status {
        props.push((INGESTION_STATUS, status.to_string()));
    }
    if let Some(status) = record.metadata_status {
        props.push((BOOK_METADATA_STATUS, status.to_string()));
    }
    let book = &record.metadata;
    if let Some(title) = &book.title {
        props.push((BOOK_TITLE, title.clone()));
    }
    if let Some(genre) = &book.genre {
        props.push((BOOK_GENRE, genre.clone()));
    }
    if !book.authors.is_empty() {
        props.push((BOOK_AUTHORS, book.authors.join(", ")));
    }
    if let Some(count) = book.chapter_count {
        props.push((NR_OF_CHAPTERS, count.to_string()));
    }
    if let Some(count) = book.page_count {
        props.push((NR_OF_PAGES, count.to_string()));
    }
    set_all(store, node, props).await
}

/// Ingestion status alone; the cheapest way to decide a title's reconcile
/// transition.
pub async fn read_status(store: &dyn ContentStore, node: NodeRef) -> Result<Option<IngestionStatus>> {
    let value = store.property(node, INGESTION_STATUS).await.or_raise(|| ErrorKind::Store)?;
    Ok(value.and_then(|value| parse_logged(INGESTION_STATUS, &value)))
}

pub async fn write_status(store: &dyn ContentStore, node: NodeRef, status: IngestionStatus) -> Result<()> {
    store.set_property(node, INGESTION_STATUS, status.as_str()).await.or_raise(|| ErrorKind::Store)
}

/// Read a chapter container. The chapter number falls back to the folder
/// name when the property is missing.
pub async fn read_chapter(store: &dyn ContentStore, node: &Node, convention: ChapterConvention) -> Result<ChapterRecord> {
    let props = store.properties(node.id).await.or_raise(|| ErrorKind::Store)?;
    let number = lenient(&props, CHAPTER_NUMBER).or_else(|| convention.number_from_folder(&node.name));
    let Some(number) = number else {
        exn::bail!(ErrorKind::InvalidValue { key: CHAPTER_NUMBER, value: node.name.clone() });
    };
    Ok(ChapterRecord {
        info: ChapterInfo {
            number,
            title: props.get(CHAPTER_TITLE).cloned(),
            author: props.get(CHAPTER_AUTHOR).cloned(),
        },
        status: lenient(&props, CHAPTER_METADATA_STATUS).unwrap_or(ChapterStatus::Missing),
    })
}

pub async fn write_chapter(store: &dyn ContentStore, node: NodeRef, record: &ChapterRecord) -> Result<()> {
    let mut props =
        vec![(CHAPTER_NUMBER, record.info.number.to_string()), (CHAPTER_METADATA_STATUS, record.status.to_string())];
    if let Some(title) = &record.info.title {
        props.push((CHAPTER_TITLE, title.clone()));
    }
    if let Some(author) = &record.info.author {
        props.push((CHAPTER_AUTHOR, author.clone()));
    }
    set_all(store, node, props).await
}

pub async fn write_metadata_status(store: &dyn ContentStore, node: NodeRef, status: MetadataStatus) -> Result<()> {
    store.set_property(node, BOOK_METADATA_STATUS, status.as_str()).await.or_raise(|| ErrorKind::Store)
}

/// Read what was last published for a title.
///
/// A version that cannot be read is an error: guessing would risk handing
/// the distributor a version it has already seen.
pub async fn read_publish(store: &dyn ContentStore, node: NodeRef) -> Result<PublishRecord> {
    let props = store.properties(node).await.or_raise(|| ErrorKind::Store)?;
    let version = match props.get(WEB_PUBLISHED_VERSION) {
        Some(value) => Some(
            Version::from_str(value)
                .or_raise(|| ErrorKind::InvalidValue { key: WEB_PUBLISHED_VERSION, value: value.clone() })?,
        ),
        None => None,
    };
    let published_at = props.get(WEB_PUBLISHED_DATE).and_then(|value| {
        match OffsetDateTime::parse(value, &Rfc3339) {
            Ok(date) => Some(date.to_utc()),
            Err(err) => {
                tracing::warn!(key = WEB_PUBLISHED_DATE, value, error = %err, "Ignoring unreadable property");
                None
            },
        }
    });
    Ok(PublishRecord { version, published_at })
}

pub async fn write_publish(store: &dyn ContentStore, node: NodeRef, version: Version, at: UtcDateTime) -> Result<()> {
    let date = OffsetDateTime::from(at)
        .format(&Rfc3339)
        .or_raise(|| ErrorKind::InvalidValue { key: WEB_PUBLISHED_DATE, value: at.to_string() })?;
    set_all(store, node, vec![(WEB_PUBLISHED_VERSION, version.to_string()), (WEB_PUBLISHED_DATE, date)]).await
}

async fn set_all(store: &dyn ContentStore, node: NodeRef, props: Vec<(&'static str, String)>) -> Result<()> {
    let props: Vec<(&str, &str)> = props.iter().map(|(key, value)| (*key, value.as_str())).collect();
    store.set_properties(node, &props).await.or_raise(|| ErrorKind::Store)
}

fn lenient<T: FromStr>(props: &BTreeMap<String, String>, key: &'static str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    props.get(key).and_then(|value| parse_logged(key, value))
}

fn parse_logged<T: FromStr>(key: &'static str, value: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(key, value, error = %err, "Ignoring unreadable property");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestpub_store::{MemoryStore, NodeKind};

    async fn title_node(store: &MemoryStore) -> NodeRef {
        let root = store.root().await.unwrap();
        store.create_node(root, "9780203807217", NodeKind::Title).await.unwrap()
    }

    #[tokio::test]
    async fn test_title_round_trip() {
        let store = MemoryStore::default();
        let node = title_node(&store).await;
        let isbn: Isbn = "9780203807217".parse().unwrap();
        let record = TitleRecord {
            isbn: isbn.clone(),
            status: Some(IngestionStatus::InProgress),
            metadata_status: Some(MetadataStatus::Partial),
            metadata: BookMetadata {
                title: Some("Tea Time".to_string()),
                genre: Some("Cookery".to_string()),
                authors: vec!["A. Writer".to_string(), "B. Editor".to_string()],
                chapter_count: Some(3),
                page_count: None,
            },
        };
        write_title(&store, node, &record).await.unwrap();
        assert_eq!(store.property(node, BOOK_AUTHORS).await.unwrap().as_deref(), Some("A. Writer, B. Editor"));
        assert_eq!(store.property(node, INGESTION_STATUS).await.unwrap().as_deref(), Some("In Progress"));
        assert_eq!(read_title(&store, node, &isbn).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_unreadable_status_is_none() {
        let store = MemoryStore::default();
        let node = title_node(&store).await;
        assert_eq!(read_status(&store, node).await.unwrap(), None);
        store.set_property(node, INGESTION_STATUS, "half done").await.unwrap();
        assert_eq!(read_status(&store, node).await.unwrap(), None);
        write_status(&store, node, IngestionStatus::Complete).await.unwrap();
        assert_eq!(read_status(&store, node).await.unwrap(), Some(IngestionStatus::Complete));
    }

    #[tokio::test]
    async fn test_chapter_number_falls_back_to_folder_name() {
        let store = MemoryStore::default();
        let title = title_node(&store).await;
        let id = store.create_node(title, "chapter-7", NodeKind::Chapter).await.unwrap();
        let node = store.node(id).await.unwrap();
        let record = read_chapter(&store, &node, ChapterConvention::Numbered).await.unwrap();
        assert_eq!(record.info.number, 7);
        assert_eq!(record.status, ChapterStatus::Missing);

        let chapter = ChapterRecord {
            info: ChapterInfo { number: 7, title: Some("Milk First".to_string()), author: None },
            status: ChapterStatus::Completed,
        };
        write_chapter(&store, id, &chapter).await.unwrap();
        assert_eq!(read_chapter(&store, &node, ChapterConvention::Numbered).await.unwrap(), chapter);
    }

    #[tokio::test]
    async fn test_publish_record() {
        let store = MemoryStore::default();
        let node = title_node(&store).await;
        assert_eq!(read_publish(&store, node).await.unwrap(), PublishRecord::default());

        let at = UtcDateTime::new(time::macros::date!(2024 - 03 - 01), time::macros::time!(12:30));
        write_publish(&store, node, Version::new(3), at).await.unwrap();
        assert_eq!(store.property(node, WEB_PUBLISHED_VERSION).await.unwrap().as_deref(), Some("3.0"));
        assert_eq!(store.property(node, WEB_PUBLISHED_DATE).await.unwrap().as_deref(), Some("2024-03-01T12:30:00Z"));
        let record = read_publish(&store, node).await.unwrap();
        assert_eq!(record.version, Some(Version::new(3)));
        assert_eq!(record.published_at, Some(at));
    }

    #[tokio::test]
    async fn test_unreadable_version_is_an_error() {
        let store = MemoryStore::default();
        let node = title_node(&store).await;
        store.set_property(node, WEB_PUBLISHED_VERSION, "vNext").await.unwrap();
        let err = read_publish(&store, node).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidValue { key: WEB_PUBLISHED_VERSION, .. }));
    }
}
