//! Error types for the [`import`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use bestpub_model::Isbn;
use derive_more::{Display, Error};

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an import failure.
///
/// Any of these fails the whole import: the partially built title is
/// removed and the archive is quarantined by the caller.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The archive could not be opened or decompressed.
    #[display("could not read archive")]
    Archive,
    /// The title metadata file was present but unreadable.
    #[display("invalid metadata file for {_0}")]
    Metadata(#[error(not(source))] Isbn),
    /// A chapter content file names a chapter folder that does not exist.
    #[display("no chapter folder for {_0:?}")]
    UnresolvedChapter(#[error(not(source))] String),
    /// A content store operation failed.
    #[display("content store operation failed")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
