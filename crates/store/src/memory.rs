//! In-memory content store for testing.

use crate::ContentStore;
use crate::error::{ErrorKind, Result};
use crate::node::{Node, NodeKind, NodeRef};
use crate::path::validate_name;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use time::UtcDateTime;
use tokio::sync::RwLock;

const ROOT: NodeRef = NodeRef(1);

struct Entry {
    node: Node,
    children: Vec<NodeRef>,
    properties: BTreeMap<String, String>,
    content: Vec<u8>,
}

struct Tree {
    next_id: u64,
    entries: HashMap<NodeRef, Entry>,
}
impl Tree {
    fn get(&self, node: NodeRef) -> Result<&Entry> {
        self.entries.get(&node).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(node)))
    }

    fn get_mut(&mut self, node: NodeRef) -> Result<&mut Entry> {
        self.entries.get_mut(&node).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(node)))
    }
}

/// In-memory content store for testing.
///
/// The whole tree sits in a `HashMap` behind a [`RwLock`], so all trait
/// methods can operate on `&self` without external synchronisation.
///
/// # Examples
///
/// ```
/// use bestpub_store::{ContentStore, MemoryStore, NodeKind};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::default();
/// let incoming = store.ensure_path("/BestPub/Incoming/Content").await?;
/// let title = store.create_node(incoming, "9780203807217", NodeKind::Title).await?;
/// assert_eq!(store.resolve("/BestPub/Incoming/Content/9780203807217").await?, Some(title));
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    name: String,
    tree: RwLock<Tree>,
}

impl MemoryStore {
    /// Change the name of the store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
impl Default for MemoryStore {
    fn default() -> Self {
        let root = Entry {
            node: Node {
                id: ROOT,
                parent: None,
                name: String::new(),
                kind: NodeKind::Folder,
                mime_type: None,
                size: 0,
                modified: UtcDateTime::now(),
            },
            children: Vec::new(),
            properties: BTreeMap::new(),
            content: Vec::new(),
        };
        Self {
            name: "memory".to_string(),
            tree: RwLock::new(Tree { next_id: ROOT.0 + 1, entries: HashMap::from([(ROOT, root)]) }),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn root(&self) -> Result<NodeRef> {
        Ok(ROOT)
    }

    async fn child_by_name(&self, parent: NodeRef, name: &str) -> Result<Option<NodeRef>> {
        let tree = self.tree.read().await;
        let entry = tree.get(parent)?;
        Ok(entry.children.iter().copied().find(|child| tree.entries.get(child).is_some_and(|e| e.node.name == name)))
    }

    async fn children(&self, parent: NodeRef) -> Result<Vec<Node>> {
        let tree = self.tree.read().await;
        let entry = tree.get(parent)?;
        entry.children.iter().map(|child| tree.get(*child).map(|e| e.node.clone())).collect()
    }

    async fn node(&self, node: NodeRef) -> Result<Node> {
        Ok(self.tree.read().await.get(node)?.node.clone())
    }

    async fn create_node(&self, parent: NodeRef, name: &str, kind: NodeKind) -> Result<NodeRef> {
        let name = validate_name(name)?;
        let mut tree = self.tree.write().await;
        let parent_entry = tree.get(parent)?;
        if !parent_entry.node.is_container() {
            exn::bail!(ErrorKind::Unsupported(parent));
        }
        let taken = parent_entry.children.iter().any(|c| tree.entries.get(c).is_some_and(|e| e.node.name == name));
        if taken {
            exn::bail!(ErrorKind::AlreadyExists { parent, name: name.to_string() });
        }
        let id = NodeRef(tree.next_id);
        tree.next_id += 1;
        let node = Node {
            id,
            parent: Some(parent),
            name: name.to_string(),
            kind,
            mime_type: None,
            size: 0,
            modified: UtcDateTime::now(),
        };
        tree.entries.insert(id, Entry { node, children: Vec::new(), properties: BTreeMap::new(), content: Vec::new() });
        tree.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    async fn delete(&self, node: NodeRef) -> Result<()> {
        if node == ROOT {
            exn::bail!(ErrorKind::Unsupported(node));
        }
        let mut tree = self.tree.write().await;
        let parent = tree.get(node)?.node.parent;
        if let Some(parent) = parent {
            tree.get_mut(parent)?.children.retain(|child| *child != node);
        }
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(entry) = tree.entries.remove(&current) {
                pending.extend(entry.children);
            }
        }
        Ok(())
    }

    async fn property(&self, node: NodeRef, key: &str) -> Result<Option<String>> {
        Ok(self.tree.read().await.get(node)?.properties.get(key).cloned())
    }

    async fn properties(&self, node: NodeRef) -> Result<BTreeMap<String, String>> {
        Ok(self.tree.read().await.get(node)?.properties.clone())
    }

    async fn set_property(&self, node: NodeRef, key: &str, value: &str) -> Result<()> {
        let mut tree = self.tree.write().await;
        let entry = tree.get_mut(node)?;
        entry.properties.insert(key.to_string(), value.to_string());
        entry.node.modified = UtcDateTime::now();
        Ok(())
    }

    async fn set_properties(&self, node: NodeRef, props: &[(&str, &str)]) -> Result<()> {
        let mut tree = self.tree.write().await;
        let entry = tree.get_mut(node)?;
        entry.properties.extend(props.iter().map(|(key, value)| (key.to_string(), value.to_string())));
        entry.node.modified = UtcDateTime::now();
        Ok(())
    }

    async fn read_content(&self, node: NodeRef) -> Result<Vec<u8>> {
        let tree = self.tree.read().await;
        let entry = tree.get(node)?;
        if entry.node.is_container() {
            exn::bail!(ErrorKind::Unsupported(node));
        }
        Ok(entry.content.clone())
    }

    async fn write_content(&self, node: NodeRef, mime_type: &str, data: &[u8]) -> Result<()> {
        let mut tree = self.tree.write().await;
        let entry = tree.get_mut(node)?;
        if entry.node.is_container() {
            exn::bail!(ErrorKind::Unsupported(node));
        }
        entry.content = data.to_vec();
        entry.node.mime_type = Some(mime_type.to_string());
        entry.node.size = data.len() as u64;
        entry.node.modified = UtcDateTime::now();
        Ok(())
    }

    async fn exists(&self, node: NodeRef) -> Result<bool> {
        Ok(self.tree.read().await.entries.contains_key(&node))
    }
}
