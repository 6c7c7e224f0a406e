//! Domain types shared by the ingestion and publishing sides of bestpub.
//!
//! Everything that crosses the content store boundary as loosely-typed
//! properties has a typed counterpart here: the [`Isbn`] title key, the
//! [`TitleRecord`](models::TitleRecord) / [`ChapterRecord`](models::ChapterRecord)
//! pair, and the [`PublishRecord`](models::PublishRecord).

mod chapter;
mod consts;
pub mod error;
mod isbn;
pub mod metadata;
pub mod models;

pub use crate::chapter::{ChapterConvention, MAX_CHAPTER_NUMBER};
pub use crate::isbn::{ISBN_LENGTH, Isbn, is_isbn};
pub use crate::metadata::{MetadataParser, PropertiesParser, TitleMetadata};
