//! The content store interface.
//!
//! Titles, chapters and their content live in a tree of named nodes. Each
//! node carries a type tag, string properties and (for content nodes) bytes
//! plus a MIME type. Implementations decide where the tree is persisted.

use crate::error::{ErrorKind, Result};
use crate::node::{Node, NodeKind, NodeRef};
use crate::path::split as split_path;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Unified interface for content stores.
///
/// Every method takes `&self` so a store can be shared behind a
/// [`StoreHandle`](crate::StoreHandle). Timeouts and retries of the
/// underlying storage are the implementation's concern; callers treat any
/// error as final for the item they are working on.
///
/// # Examples
///
/// ```
/// use bestpub_store::{ContentStore, NodeKind, error::Result};
///
/// async fn chapter_names(store: &dyn ContentStore, path: &str) -> Result<Vec<String>> {
///     let Some(title) = store.resolve(path).await? else {
///         return Ok(Vec::new());
///     };
///     let children = store.children(title).await?;
///     Ok(children.into_iter().filter(|c| c.kind == NodeKind::Chapter).map(|c| c.name).collect())
/// }
/// ```
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// The root container every path starts from.
    async fn root(&self) -> Result<NodeRef>;

    /// Look up a direct child by its name.
    async fn child_by_name(&self, parent: NodeRef, name: &str) -> Result<Option<NodeRef>>;

    /// Direct children in creation order.
    async fn children(&self, parent: NodeRef) -> Result<Vec<Node>>;

    /// Attributes of a single node. Fails with
    /// [`NotFound`](ErrorKind::NotFound) for unknown or deleted nodes.
    async fn node(&self, node: NodeRef) -> Result<Node>;

    /// Create a new child. Containers and content nodes alike are created
    /// here; content nodes start out empty.
    ///
    /// Fails with [`AlreadyExists`](ErrorKind::AlreadyExists) if a sibling
    /// with the same name exists, and [`Unsupported`](ErrorKind::Unsupported)
    /// if `parent` is a content node.
    async fn create_node(&self, parent: NodeRef, name: &str, kind: NodeKind) -> Result<NodeRef>;

    /// Delete a node together with its whole subtree and properties.
    async fn delete(&self, node: NodeRef) -> Result<()>;

    async fn property(&self, node: NodeRef, key: &str) -> Result<Option<String>>;

    async fn properties(&self, node: NodeRef) -> Result<BTreeMap<String, String>>;

    async fn set_property(&self, node: NodeRef, key: &str, value: &str) -> Result<()>;

    /// Set several properties at once. Either all of them are written or,
    /// on error, none are.
    async fn set_properties(&self, node: NodeRef, props: &[(&str, &str)]) -> Result<()>;

    async fn read_content(&self, node: NodeRef) -> Result<Vec<u8>>;

    /// Replace the content (and MIME type) of a content node.
    async fn write_content(&self, node: NodeRef, mime_type: &str, data: &[u8]) -> Result<()>;

    async fn exists(&self, node: NodeRef) -> Result<bool>;

    /// Resolve a `/`-separated path from the root.
    async fn resolve(&self, path: &str) -> Result<Option<NodeRef>> {
        let mut current = self.root().await?;
        for name in split_path(path)? {
            match self.child_by_name(current, &name).await? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolve a path, creating any missing segment as a plain folder.
    async fn ensure_path(&self, path: &str) -> Result<NodeRef> {
        let mut current = self.root().await?;
        for name in split_path(path)? {
            current = match self.child_by_name(current, &name).await? {
                Some(child) => child,
                None => {
                    tracing::debug!(store = self.name(), %name, "Creating missing folder");
                    self.create_node(current, &name, NodeKind::Folder).await?
                },
            };
        }
        Ok(current)
    }

    /// Create a content node and write its bytes.
    async fn create_file(&self, parent: NodeRef, name: &str, mime_type: &str, data: &[u8]) -> Result<NodeRef> {
        let node = self.create_node(parent, name, NodeKind::Content).await?;
        self.write_content(node, mime_type, data).await?;
        Ok(node)
    }
}
