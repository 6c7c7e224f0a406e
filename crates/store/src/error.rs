//! Content Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::NodeRef;
use derive_more::{Display, Error};

/// A content store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for content store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Node does not exist (or was deleted)
    #[display("node not found: {_0}")]
    NotFound(#[error(not(source))] NodeRef),
    /// A sibling with the same name already exists
    #[display("node already exists: {parent}/{name}")]
    AlreadyExists { parent: NodeRef, name: String },
    /// Node names are single path segments
    #[display("invalid node name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {_0:?}")]
    InvalidPath(#[error(not(source))] String),
    /// Operation is not valid for this kind of node (children under content,
    /// content on a container, deleting the root)
    #[display("unsupported operation on node {_0}")]
    Unsupported(#[error(not(source))] NodeRef),
    /// Backend-specific error
    #[display("backend error")]
    Backend,
    /// Stored data could not be decoded
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend)
    }
}
