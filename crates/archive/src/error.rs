//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a readable ZIP archive. Don't retry with the same input.
    #[display("invalid or corrupted archive")]
    InvalidArchive,
    /// An entry with the same path was already written.
    #[display("duplicate archive entry: {_0}")]
    DuplicateEntry(#[error(not(source))] String),
    /// Entry names must be relative, `/`-separated, and non-empty.
    #[display("invalid archive entry name: {_0:?}")]
    InvalidEntryName(#[error(not(source))] String),
    #[display("unsupported compression method: {_0}")]
    UnsupportedMethod(#[error(not(source))] String),
    /// An I/O operation failed while reading or writing the archive.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
