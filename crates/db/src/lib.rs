//! SQLite-backed content store.
//!
//! The whole content tree (titles, chapters, their files and properties)
//! lives in two tables: `nodes` (with content inline as a BLOB) and
//! `properties`. Deleting a node cascades to its subtree and properties.

mod db;
pub mod error;
mod models;
mod store;

pub use crate::db::Database;
pub use crate::store::SqliteStore;
