use crate::Database;
use crate::models::{NodeRow, node_id, node_ref, timestamp};
use async_trait::async_trait;
use bestpub_store::error::{ErrorKind, Result};
use bestpub_store::{ContentStore, Node, NodeKind, NodeRef, validate_name};
use exn::ResultExt;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use time::UtcDateTime;

const ROOT: NodeRef = NodeRef(1);

/// [`ContentStore`] persisted in the SQLite [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    name: String,
    pool: SqlitePool,
}
impl From<&Database> for SqliteStore {
    fn from(db: &Database) -> Self {
        Self::new("sqlite", db)
    }
}
impl SqliteStore {
    pub fn new(name: impl Into<String>, db: &Database) -> Self {
        Self { name: name.into(), pool: db.pool().clone() }
    }

    fn now() -> Result<i64> {
        timestamp(UtcDateTime::now())
    }

    async fn find_node(&self, node: NodeRef) -> Result<Option<Node>> {
        let row: Option<NodeRow> = sqlx::query_as(include_str!("../queries/get_node.sql"))
            .bind(node_id(node)?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        row.map(Node::try_from).transpose()
    }

    async fn touch(&self, node: NodeRef) -> Result<()> {
        sqlx::query(include_str!("../queries/touch_node.sql"))
            .bind(Self::now()?)
            .bind(node_id(node)?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn root(&self) -> Result<NodeRef> {
        Ok(ROOT)
    }

    async fn child_by_name(&self, parent: NodeRef, name: &str) -> Result<Option<NodeRef>> {
        let id: Option<i64> = sqlx::query_scalar(include_str!("../queries/get_child_by_name.sql"))
            .bind(node_id(parent)?)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        id.map(node_ref).transpose()
    }

    async fn children(&self, parent: NodeRef) -> Result<Vec<Node>> {
        if !self.exists(parent).await? {
            exn::bail!(ErrorKind::NotFound(parent));
        }
        let rows: Vec<NodeRow> = sqlx::query_as(include_str!("../queries/list_children.sql"))
            .bind(node_id(parent)?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        rows.into_iter().map(Node::try_from).collect()
    }

    async fn node(&self, node: NodeRef) -> Result<Node> {
        match self.find_node(node).await? {
            Some(found) => Ok(found),
            None => exn::bail!(ErrorKind::NotFound(node)),
        }
    }

    async fn create_node(&self, parent: NodeRef, name: &str, kind: NodeKind) -> Result<NodeRef> {
        let name = validate_name(name)?;
        let parent_id = node_id(parent)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Backend)?;
        let parent_kind: Option<String> = sqlx::query_scalar("SELECT kind FROM nodes WHERE id = ?")
            .bind(parent_id)
            .fetch_optional(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        match parent_kind.as_deref().map(str::parse::<NodeKind>).transpose()? {
            None => exn::bail!(ErrorKind::NotFound(parent)),
            Some(kind) if !kind.is_container() => exn::bail!(ErrorKind::Unsupported(parent)),
            Some(_) => {},
        }
        let existing: Option<i64> = sqlx::query_scalar(include_str!("../queries/get_child_by_name.sql"))
            .bind(parent_id)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        if existing.is_some() {
            exn::bail!(ErrorKind::AlreadyExists { parent, name: name.to_string() });
        }
        let now = Self::now()?;
        let result = sqlx::query(include_str!("../queries/insert_node.sql"))
            .bind(parent_id)
            .bind(name)
            .bind(kind.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        tx.commit().await.or_raise(|| ErrorKind::Backend)?;
        node_ref(result.last_insert_rowid())
    }

    async fn delete(&self, node: NodeRef) -> Result<()> {
        if node == ROOT {
            exn::bail!(ErrorKind::Unsupported(node));
        }
        let result = sqlx::query(include_str!("../queries/delete_node.sql"))
            .bind(node_id(node)?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NotFound(node));
        }
        tracing::trace!(store = %self.name, %node, "Deleted node and subtree");
        Ok(())
    }

    async fn property(&self, node: NodeRef, key: &str) -> Result<Option<String>> {
        if !self.exists(node).await? {
            exn::bail!(ErrorKind::NotFound(node));
        }
        sqlx::query_scalar(include_str!("../queries/get_property.sql"))
            .bind(node_id(node)?)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)
    }

    async fn properties(&self, node: NodeRef) -> Result<BTreeMap<String, String>> {
        if !self.exists(node).await? {
            exn::bail!(ErrorKind::NotFound(node));
        }
        let rows: Vec<(String, String)> = sqlx::query_as(include_str!("../queries/list_properties.sql"))
            .bind(node_id(node)?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        Ok(rows.into_iter().collect())
    }

    async fn set_property(&self, node: NodeRef, key: &str, value: &str) -> Result<()> {
        if !self.exists(node).await? {
            exn::bail!(ErrorKind::NotFound(node));
        }
        sqlx::query(include_str!("../queries/upsert_property.sql"))
            .bind(node_id(node)?)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        self.touch(node).await
    }

    async fn set_properties(&self, node: NodeRef, props: &[(&str, &str)]) -> Result<()> {
        let id = node_id(node)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Backend)?;
        let exists: i64 = sqlx::query_scalar(include_str!("../queries/node_exists.sql"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        if exists == 0 {
            exn::bail!(ErrorKind::NotFound(node));
        }
        for &(key, value) in props {
            sqlx::query(include_str!("../queries/upsert_property.sql"))
                .bind(id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Backend)?;
        }
        sqlx::query(include_str!("../queries/touch_node.sql"))
            .bind(Self::now()?)
            .bind(id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        tx.commit().await.or_raise(|| ErrorKind::Backend)?;
        Ok(())
    }

    async fn read_content(&self, node: NodeRef) -> Result<Vec<u8>> {
        let row: Option<(String, Option<Vec<u8>>)> = sqlx::query_as(include_str!("../queries/get_content.sql"))
            .bind(node_id(node)?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        let Some((kind, content)) = row else {
            exn::bail!(ErrorKind::NotFound(node));
        };
        if kind.parse::<NodeKind>()?.is_container() {
            exn::bail!(ErrorKind::Unsupported(node));
        }
        Ok(content.unwrap_or_default())
    }

    async fn write_content(&self, node: NodeRef, mime_type: &str, data: &[u8]) -> Result<()> {
        let size = i64::try_from(data.len()).or_raise(|| ErrorKind::InvalidData("content size"))?;
        let result = sqlx::query(include_str!("../queries/update_content.sql"))
            .bind(data)
            .bind(mime_type)
            .bind(size)
            .bind(Self::now()?)
            .bind(node_id(node)?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        if result.rows_affected() == 0 {
            // Either missing or a container.
            self.node(node).await?;
            exn::bail!(ErrorKind::Unsupported(node));
        }
        Ok(())
    }

    async fn exists(&self, node: NodeRef) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(include_str!("../queries/node_exists.sql"))
            .bind(node_id(node)?)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Backend)?;
        Ok(exists != 0)
    }
}
