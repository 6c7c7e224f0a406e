//! Error types for the [`scan`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Both directory variants are configuration problems, not transient ones:
/// the cycle is skipped and the next one tries again.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("drop directory does not exist: {}", _0.display())]
    DirectoryNotFound(#[error(not(source))] PathBuf),
    #[display("drop directory is not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    #[display("could not read the drop directory")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
