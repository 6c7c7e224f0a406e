//! Error types for the [`ingest`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use bestpub_model::Isbn;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// An ingest error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The archive's name, minus its extension, is not an ISBN.
    #[display("archive name is not an ISBN: {}", _0.display())]
    InvalidTitleKey(#[error(not(source))] PathBuf),
    /// The importer failed; whatever it created has been removed.
    #[display("import failed for {_0}")]
    ImportFailed(#[error(not(source))] Isbn),
    /// The title's previous container could not be inspected or removed.
    #[display("content store operation failed")]
    Store,
    /// A failed archive could not be moved to quarantine and is still in
    /// the drop directory.
    #[display("could not quarantine {}", _0.display())]
    Quarantine(#[error(not(source))] PathBuf),
    /// The title was imported but its archive could not be removed.
    #[display("could not remove imported archive {}", _0.display())]
    Cleanup(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store | Self::Quarantine(_) | Self::Cleanup(_))
    }
}
