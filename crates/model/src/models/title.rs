use super::{Genre, IngestionStatus, MetadataStatus, Version};
use crate::Isbn;
use time::UtcDateTime;

/// Descriptive metadata for a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: Option<String>,
    /// Free text; see [`known_genre`](Self::known_genre).
    pub genre: Option<String>,
    pub authors: Vec<String>,
    pub chapter_count: Option<u32>,
    pub page_count: Option<u32>,
}
impl BookMetadata {
    /// The genre, if it is one of the editorially recognised ones.
    pub fn known_genre(&self) -> Option<Genre> {
        self.genre.as_deref().and_then(|genre| genre.parse().ok())
    }
}

/// A title container as stored in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRecord {
    pub isbn: Isbn,
    /// `None` when the status property is missing or unreadable; callers
    /// treat that the same as an interrupted ingestion.
    pub status: Option<IngestionStatus>,
    pub metadata_status: Option<MetadataStatus>,
    pub metadata: BookMetadata,
}
impl TitleRecord {
    pub fn new(isbn: Isbn) -> Self {
        Self { isbn, status: None, metadata_status: None, metadata: BookMetadata::default() }
    }

    pub fn is_complete(&self) -> bool {
        self.status == Some(IngestionStatus::Complete)
    }
}

/// What was last delivered to the pickup directory for a title.
///
/// An empty record means the title has never been published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishRecord {
    pub version: Option<Version>,
    pub published_at: Option<UtcDateTime>,
}
impl PublishRecord {
    /// Version the next publish will carry.
    pub fn next_version(&self) -> Version {
        Version::next_after(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_genre() {
        let mut metadata = BookMetadata { genre: Some("fantasy".to_string()), ..Default::default() };
        assert_eq!(metadata.known_genre(), Some(Genre::Fantasy));
        metadata.genre = Some("Solarpunk".to_string());
        assert_eq!(metadata.known_genre(), None);
    }

    #[test]
    fn test_publish_record_next_version() {
        assert_eq!(PublishRecord::default().next_version(), Version::FIRST);
        let record = PublishRecord { version: Some(Version::new(4)), published_at: Some(UtcDateTime::now()) };
        assert_eq!(record.next_version().to_string(), "5.0");
    }

    #[test]
    fn test_title_is_complete() {
        let mut title = TitleRecord::new("9780203807217".parse().unwrap());
        assert!(!title.is_complete());
        title.status = Some(IngestionStatus::InProgress);
        assert!(!title.is_complete());
        title.status = Some(IngestionStatus::Complete);
        assert!(title.is_complete());
    }
}
