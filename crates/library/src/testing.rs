//! Fixtures shared by the unit tests of this crate.

use crate::records::WEB_PUBLISHED_VERSION;
use async_trait::async_trait;
use bestpub_archive::{ArchiveWriter, Method};
use bestpub_store::error::{ErrorKind, Result};
use bestpub_store::{ContentStore, MemoryStore, Node, NodeKind, NodeRef, StoreHandle};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const ISBN: &str = "9780203807217";

/// Write a ZIP archive at `dir/name` holding `files`.
pub(crate) fn write_archive(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = ArchiveWriter::new(File::create(&path).unwrap());
    for (entry, data) in files {
        writer.add_file(entry, data.as_bytes(), Method::Deflated).unwrap();
    }
    writer.finish().unwrap();
    path
}

/// A two chapter delivery with one of everything.
pub(crate) fn delivery() -> Vec<(&'static str, &'static str)> {
    vec![
        ("9780203807217.txt", "bookTitle=Tea Time\nbookAuthors=A. Writer\nnrOfChapters=2\nchapter.1.chapterTitle=Milk First\n"),
        ("package.opf", "<package/>"),
        ("css/main.css", "body {}"),
        ("images/cover.jpg", "jpeg"),
        ("toc.ncx", "<ncx/>"),
        ("9780203807217-Chapter-001.xhtml", "<html>one</html>"),
        ("OEBPS/9780203807217-Chapter-002.xhtml", "<html>two</html>"),
    ]
}

/// A context over an empty in-memory store, with the drop and pickup
/// directories inside `dir`.
pub(crate) fn context(dir: &Path) -> crate::Context {
    context_with_store(dir, Arc::new(MemoryStore::default()))
}

pub(crate) fn context_with_store(dir: &Path, store: StoreHandle) -> crate::Context {
    let mut config = bestpub_config::Config::default();
    config.ingestion.drop_directory = dir.join("drop");
    config.publishing.pickup_directory = dir.join("pickup");
    config.publishing.temp_directory = Some(dir.join("tmp"));
    for path in [&config.ingestion.drop_directory, &config.publishing.pickup_directory, &dir.join("tmp")] {
        std::fs::create_dir_all(path).unwrap();
    }
    crate::Context::new(store, &config)
}

/// Wraps an in-memory store and fails every write of a published version.
#[derive(Default)]
pub(crate) struct RecordRefusingStore {
    inner: MemoryStore,
}

impl RecordRefusingStore {
    fn refuse(key: &str) -> Result<()> {
        if key == WEB_PUBLISHED_VERSION {
            exn::bail!(ErrorKind::Backend);
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for RecordRefusingStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn root(&self) -> Result<NodeRef> {
        self.inner.root().await
    }

    async fn child_by_name(&self, parent: NodeRef, name: &str) -> Result<Option<NodeRef>> {
        self.inner.child_by_name(parent, name).await
    }

    async fn children(&self, parent: NodeRef) -> Result<Vec<Node>> {
        self.inner.children(parent).await
    }

    async fn node(&self, node: NodeRef) -> Result<Node> {
        self.inner.node(node).await
    }

    async fn create_node(&self, parent: NodeRef, name: &str, kind: NodeKind) -> Result<NodeRef> {
        self.inner.create_node(parent, name, kind).await
    }

    async fn delete(&self, node: NodeRef) -> Result<()> {
        self.inner.delete(node).await
    }

    async fn property(&self, node: NodeRef, key: &str) -> Result<Option<String>> {
        self.inner.property(node, key).await
    }

    async fn properties(&self, node: NodeRef) -> Result<BTreeMap<String, String>> {
        self.inner.properties(node).await
    }

    async fn set_property(&self, node: NodeRef, key: &str, value: &str) -> Result<()> {
        Self::refuse(key)?;
        self.inner.set_property(node, key, value).await
    }

    async fn set_properties(&self, node: NodeRef, props: &[(&str, &str)]) -> Result<()> {
        for (key, _) in props {
            Self::refuse(key)?;
        }
        self.inner.set_properties(node, props).await
    }

    async fn read_content(&self, node: NodeRef) -> Result<Vec<u8>> {
        self.inner.read_content(node).await
    }

    async fn write_content(&self, node: NodeRef, mime_type: &str, data: &[u8]) -> Result<()> {
        self.inner.write_content(node, mime_type, data).await
    }

    async fn exists(&self, node: NodeRef) -> Result<bool> {
        self.inner.exists(node).await
    }
}
