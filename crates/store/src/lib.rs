pub mod error;
#[cfg(feature = "mock")]
mod memory;
mod node;
mod path;
mod store;

#[cfg(feature = "mock")]
pub use crate::memory::MemoryStore;
pub use crate::node::{Node, NodeKind, NodeRef};
pub use crate::path::{split as split_path, validate_name};
pub use crate::store::ContentStore;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn ContentStore + Send + Sync>;
