//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each operation raises its own
//! module-level error first; this is the outermost layer callers see.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not list the drop directory")]
    Scan,
    #[display("could not move a file into quarantine")]
    Quarantine,
    #[display("could not reconcile an archive")]
    Ingest,
    /// The cycle was ended early on purpose; see
    /// [`InvalidNamePolicy::AbortCycle`](bestpub_config::InvalidNamePolicy::AbortCycle).
    #[display("ingestion cycle aborted")]
    CycleAborted,
    #[display("could not publish title")]
    Publish,
    #[display("could not read title status")]
    Status,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Scan | Self::Quarantine | Self::Ingest)
    }
}
