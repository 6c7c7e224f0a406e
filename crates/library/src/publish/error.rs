//! Error types for the [`publish`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use bestpub_model::Isbn;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A publish error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for publish operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every variant means nothing was delivered and the title's publish record
/// is unchanged.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("no title container for {_0}")]
    TitleNotFound(#[error(not(source))] Isbn),
    /// Ingestion has not finished with this title.
    #[display("title {_0} is not completely ingested")]
    TitleIncomplete(#[error(not(source))] Isbn),
    /// The stored publish version could not be read, so the next one is
    /// unknown.
    #[display("unreadable publish record for {_0}")]
    InvalidPublishRecord(#[error(not(source))] Isbn),
    /// The title has no `package.opf`; the only mandatory part of an artifact.
    #[display("title {_0} has no package descriptor")]
    MissingPackageDescriptor(#[error(not(source))] Isbn),
    #[display("could not assemble artifact")]
    AssemblyFailed,
    #[display("could not deliver artifact to {}", _0.display())]
    PublishDeliveryFailed(#[error(not(source))] PathBuf),
    #[display("content store operation failed")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AssemblyFailed | Self::PublishDeliveryFailed(_) | Self::Store)
    }
}
