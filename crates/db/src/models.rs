use bestpub_store::error::{Error, ErrorKind};
use bestpub_store::{Node, NodeKind, NodeRef};
use exn::ResultExt;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct NodeRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub kind: String,
    pub mime_type: Option<String>,
    pub size: i64,
    pub modified_at: i64,
}
impl TryFrom<NodeRow> for Node {
    type Error = Error;
    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        Ok(Node {
            id: node_ref(row.id)?,
            parent: row.parent_id.map(node_ref).transpose()?,
            name: row.name,
            kind: row.kind.parse::<NodeKind>()?,
            mime_type: row.mime_type,
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("node size"))?,
            modified: from_timestamp(row.modified_at)?,
        })
    }
}

pub(crate) fn node_ref(id: i64) -> Result<NodeRef, Error> {
    Ok(NodeRef(u64::try_from(id).or_raise(|| ErrorKind::InvalidData("node id"))?))
}

pub(crate) fn node_id(node: NodeRef) -> Result<i64, Error> {
    i64::try_from(node.0).or_raise(|| ErrorKind::InvalidData("node id"))
}

pub(crate) fn timestamp(at: UtcDateTime) -> Result<i64, Error> {
    i64::try_from(at.unix_timestamp_nanos()).or_raise(|| ErrorKind::InvalidData("timestamp"))
}

pub(crate) fn from_timestamp(nanos: i64) -> Result<UtcDateTime, Error> {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(nanos)).or_raise(|| ErrorKind::InvalidData("timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> NodeRow {
        NodeRow {
            id: 42,
            parent_id: Some(7),
            name: "package.opf".to_string(),
            kind: "content".to_string(),
            mime_type: Some("application/oebps-package+xml".to_string()),
            size: 1024,
            modified_at: 1_767_225_600_123_456_789,
        }
    }

    #[test]
    fn test_row_to_model() {
        let node = Node::try_from(row()).unwrap();
        assert_eq!(node.id, NodeRef(42));
        assert_eq!(node.parent, Some(NodeRef(7)));
        assert_eq!(node.kind, NodeKind::Content);
        assert_eq!(node.size, 1024);
        // Nanosecond precision survives the round trip.
        assert_eq!(timestamp(node.modified).unwrap(), 1_767_225_600_123_456_789);
    }

    #[test]
    fn test_row_with_invalid_kind() {
        let mut row = row();
        row.kind = "shortcut".to_string();
        assert!(Node::try_from(row).is_err());
    }

    #[test]
    fn test_row_with_negative_size() {
        let mut row = row();
        row.size = -1;
        let err = Node::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("node size")));
    }
}
