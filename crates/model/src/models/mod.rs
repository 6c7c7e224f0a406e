mod chapter;
mod genre;
mod status;
mod title;
mod version;

pub use self::chapter::{ChapterInfo, ChapterRecord};
pub use self::genre::Genre;
pub use self::status::{ChapterStatus, IngestionStatus, MetadataStatus};
pub use self::title::{BookMetadata, PublishRecord, TitleRecord};
pub use self::version::Version;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}
