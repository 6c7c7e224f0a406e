use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::UtcDateTime;

/// Opaque handle to a node in a content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(pub u64);
impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

/// Node type tag. Chapter folders are identified by this tag, never by
/// their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain container
    Folder,
    /// Title container, named by ISBN
    Title,
    /// Chapter container below a title
    Chapter,
    /// Leaf holding bytes and a MIME type
    Content,
}
impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Title => "title",
            Self::Chapter => "chapter",
            Self::Content => "content",
        }
    }

    /// Returns `true` for every kind that may hold children.
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Content)
    }
}
impl FromStr for NodeKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "folder" => Self::Folder,
            "title" => Self::Title,
            "chapter" => Self::Chapter,
            "content" => Self::Content,
            _ => exn::bail!(ErrorKind::InvalidData("node kind")),
        })
    }
}
impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A snapshot of a node's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeRef,
    /// `None` only for the store root
    pub parent: Option<NodeRef>,
    pub name: String,
    pub kind: NodeKind,
    /// Only set on [`NodeKind::Content`] nodes once content is written.
    pub mime_type: Option<String>,
    /// Content length in bytes (zero for containers)
    pub size: u64,
    pub modified: UtcDateTime,
}
impl Node {
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}
