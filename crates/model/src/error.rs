//! Model Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The value is not a 13-digit ISBN starting with `978` or `979`.
    #[display("invalid title key: {_0:?}")]
    InvalidTitleKey(#[error(not(source))] String),
    /// A stored publish version could not be parsed.
    #[display("invalid version: {_0:?}")]
    InvalidVersion(#[error(not(source))] String),
    /// A stored status property holds an unknown value.
    #[display("unknown {field} value: {value:?}")]
    InvalidStatus { field: &'static str, value: String },
    /// The title metadata file is malformed.
    #[display("invalid metadata on line {line}: {reason}")]
    InvalidMetadata { line: usize, reason: String },
    #[display("no chapter number in filename: {_0:?}")]
    InvalidChapterFilename(#[error(not(source))] String),
    #[display("unknown genre: {_0:?}")]
    UnknownGenre(#[error(not(source))] String),
    /// Chapter numbers must stay within `0..=200`.
    #[display("chapter number {_0} out of range")]
    ChapterOutOfRange(#[error(not(source))] u32),
    #[display("unknown chapter naming convention: {_0:?}")]
    UnknownConvention(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Everything here is a property of the input value.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidTitleKey("invalidname".to_string()).to_string(), "invalid title key: \"invalidname\"");
        assert_eq!(ErrorKind::ChapterOutOfRange(201).to_string(), "chapter number 201 out of range");
        assert_eq!(
            ErrorKind::InvalidMetadata { line: 3, reason: "missing '='".to_string() }.to_string(),
            "invalid metadata on line 3: missing '='"
        );
    }
}
