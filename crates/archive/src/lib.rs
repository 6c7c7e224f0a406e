//! ZIP archive primitives.
//!
//! Reading is used to unpack delivered archives; writing builds published
//! artifacts, where entry order and per-entry compression are significant.

pub mod error;
mod method;
mod read;
mod write;

pub use crate::read::{Entry, read_archive, read_entries};
pub use crate::write::ArchiveWriter;

/// Per-entry storage method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// No compression. Required for entries that readers sniff directly
    /// from the archive bytes, such as an EPUB `mimetype`.
    Stored,
    #[default]
    Deflated,
}
