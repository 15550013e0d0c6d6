//! Document repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{Document, DocumentId, PropValue, WorkspaceId};
use libsql::{params, Connection, Row};

/// Trait for document storage operations
#[allow(async_fn_in_trait)]
pub trait DocumentRepository {
    /// Persist a new document
    async fn create(&self, document: &Document) -> Result<()>;

    /// Get a document by ID (excluding deleted)
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// List documents of a workspace (excluding deleted), newest first
    async fn list(
        &self,
        workspace_id: &WorkspaceId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Document>>;

    /// List documents sitting directly in the given folder
    async fn list_by_folder(
        &self,
        workspace_id: &WorkspaceId,
        folder_pathname: &str,
    ) -> Result<Vec<Document>>;

    /// Update a document's title and content
    async fn update_content(
        &self,
        id: &DocumentId,
        title: &str,
        content: &str,
    ) -> Result<Document>;

    /// Set or clear the bookmark flag
    async fn set_bookmarked(&self, id: &DocumentId, bookmarked: bool) -> Result<Document>;

    /// Set one typed property on a document
    async fn set_prop(&self, id: &DocumentId, name: &str, value: PropValue) -> Result<Document>;

    /// List document IDs matching an ID prefix, newest first
    async fn list_ids_by_prefix(
        &self,
        workspace_id: &WorkspaceId,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>>;

    /// Soft delete a document
    async fn delete(&self, id: &DocumentId) -> Result<()>;
}

/// libSQL implementation of `DocumentRepository`
pub struct LibSqlDocumentRepository<'a> {
    conn: &'a Connection,
}

const DOCUMENT_COLUMNS: &str = "id, workspace_id, title, content, folder_pathname, \
                                tags, props, bookmarked, created_at, updated_at, is_deleted";

impl<'a> LibSqlDocumentRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_document(row: &Row) -> Result<Document> {
        let id: String = row.get(0)?;
        let workspace_id: String = row.get(1)?;
        let tags: String = row.get(5)?;
        let props: String = row.get(6)?;

        Ok(Document {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("invalid document id: {id}")))?,
            workspace_id: workspace_id
                .parse()
                .map_err(|_| Error::Database(format!("invalid workspace id: {workspace_id}")))?,
            title: row.get(2)?,
            content: row.get(3)?,
            folder_pathname: row.get(4)?,
            tags: serde_json::from_str(&tags)?,
            props: serde_json::from_str::<BTreeMap<String, PropValue>>(&props)?,
            bookmarked: row.get::<i32>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            is_deleted: row.get::<i32>(10)? != 0,
        })
    }

    async fn fetch_one(&self, id: &DocumentId) -> Result<Document> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn write_props(
        &self,
        id: &DocumentId,
        props: &BTreeMap<String, PropValue>,
        now: i64,
    ) -> Result<()> {
        self.conn
            .execute(
                "UPDATE documents SET props = ?, updated_at = ? WHERE id = ? AND is_deleted = 0",
                params![serde_json::to_string(props)?, now, id.as_str()],
            )
            .await?;
        Ok(())
    }
}

impl DocumentRepository for LibSqlDocumentRepository<'_> {
    async fn create(&self, document: &Document) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO documents
                 (id, workspace_id, title, content, folder_pathname, tags, props,
                  bookmarked, created_at, updated_at, is_deleted)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    document.id.as_str(),
                    document.workspace_id.as_str(),
                    document.title.clone(),
                    document.content.clone(),
                    document.folder_pathname.clone(),
                    serde_json::to_string(&document.tags)?,
                    serde_json::to_string(&document.props)?,
                    i32::from(document.bookmarked),
                    document.created_at,
                    document.updated_at,
                    i32::from(document.is_deleted)
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ? AND is_deleted = 0"
                ),
                params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_document(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        workspace_id: &WorkspaceId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Document>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents
                     WHERE workspace_id = ? AND is_deleted = 0
                     ORDER BY updated_at DESC
                     LIMIT ? OFFSET ?"
                ),
                params![workspace_id.as_str(), limit as i64, offset as i64],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(Self::parse_document(&row)?);
        }
        Ok(documents)
    }

    async fn list_by_folder(
        &self,
        workspace_id: &WorkspaceId,
        folder_pathname: &str,
    ) -> Result<Vec<Document>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents
                     WHERE workspace_id = ? AND folder_pathname = ? AND is_deleted = 0
                     ORDER BY updated_at DESC"
                ),
                params![workspace_id.as_str(), folder_pathname],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(Self::parse_document(&row)?);
        }
        Ok(documents)
    }

    async fn update_content(
        &self,
        id: &DocumentId,
        title: &str,
        content: &str,
    ) -> Result<Document> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE documents SET title = ?, content = ?, updated_at = ?
                 WHERE id = ? AND is_deleted = 0",
                params![title, content, now, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.fetch_one(id).await
    }

    async fn set_bookmarked(&self, id: &DocumentId, bookmarked: bool) -> Result<Document> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE documents SET bookmarked = ?, updated_at = ?
                 WHERE id = ? AND is_deleted = 0",
                params![i32::from(bookmarked), now, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.fetch_one(id).await
    }

    async fn set_prop(&self, id: &DocumentId, name: &str, value: PropValue) -> Result<Document> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Property name must not be empty".into()));
        }

        let mut document = self.fetch_one(id).await?;
        document.props.insert(name.to_string(), value);

        let now = chrono::Utc::now().timestamp_millis();
        self.write_props(id, &document.props, now).await?;
        self.fetch_one(id).await
    }

    async fn list_ids_by_prefix(
        &self,
        workspace_id: &WorkspaceId,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM documents
                 WHERE workspace_id = ? AND is_deleted = 0 AND id LIKE ?
                 ORDER BY updated_at DESC
                 LIMIT ?",
                params![workspace_id.as_str(), format!("{prefix}%"), limit as i64],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE documents SET is_deleted = 1, updated_at = ?
                 WHERE id = ? AND is_deleted = 0",
                params![now, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, LibSqlWorkspaceRepository, WorkspaceRepository};
    use pretty_assertions::assert_eq;

    async fn setup() -> (Database, WorkspaceId) {
        let db = Database::open_in_memory().await.unwrap();
        let workspace = LibSqlWorkspaceRepository::new(db.connection())
            .create("test")
            .await
            .unwrap();
        (db, workspace.id)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_and_get_round_trips_tags_and_props() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let mut document = Document::new(workspace_id, "Plan", "Q3 roadmap", "/projects");
        document.add_tag("work");
        document
            .props
            .insert("status".to_string(), PropValue::Text("open".to_string()));
        repo.create(&document).await.unwrap();

        let fetched = repo.get(&document.id).await.unwrap().unwrap();
        assert_eq!(fetched, document);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_is_newest_first_and_paged() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        for (index, title) in ["one", "two", "three"].iter().enumerate() {
            let mut document = Document::new(workspace_id, *title, "", "/");
            document.created_at = 1_000 + index as i64;
            document.updated_at = document.created_at;
            repo.create(&document).await.unwrap();
        }

        let newest = repo.list(&workspace_id, 2, 0).await.unwrap();
        let titles: Vec<_> = newest.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);

        let rest = repo.list(&workspace_id, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "one");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_by_folder_is_exact() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        repo.create(&Document::new(workspace_id, "a", "", "/projects"))
            .await
            .unwrap();
        repo.create(&Document::new(workspace_id, "b", "", "/projects/alpha"))
            .await
            .unwrap();

        let documents = repo
            .list_by_folder(&workspace_id, "/projects")
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].title, "a");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_content_touches_timestamp() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let document = Document::new(workspace_id, "Old", "old body", "/");
        repo.create(&document).await.unwrap();

        let updated = repo
            .update_content(&document.id, "New", "new body")
            .await
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "new body");
        assert!(updated.updated_at >= document.updated_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bookmark_flag_round_trips() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let document = Document::new(workspace_id, "Starred", "", "/");
        repo.create(&document).await.unwrap();

        let bookmarked = repo.set_bookmarked(&document.id, true).await.unwrap();
        assert!(bookmarked.bookmarked);

        let cleared = repo.set_bookmarked(&document.id, false).await.unwrap();
        assert!(!cleared.bookmarked);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_prop_merges_into_existing_props() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let document = Document::new(workspace_id, "Typed", "", "/");
        repo.create(&document).await.unwrap();

        repo.set_prop(&document.id, "priority", PropValue::Number(3))
            .await
            .unwrap();
        let updated = repo
            .set_prop(&document.id, "status", PropValue::Text("open".to_string()))
            .await
            .unwrap();

        assert_eq!(updated.props.len(), 2);
        assert_eq!(updated.props.get("priority"), Some(&PropValue::Number(3)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_hides_document() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let document = Document::new(workspace_id, "Gone", "", "/");
        repo.create(&document).await.unwrap();
        repo.delete(&document.id).await.unwrap();

        assert!(repo.get(&document.id).await.unwrap().is_none());
        assert!(repo.list(&workspace_id, 10, 0).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&document.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn prefix_lookup_matches_ids() {
        let (db, workspace_id) = setup().await;
        let repo = LibSqlDocumentRepository::new(db.connection());

        let document = Document::new(workspace_id, "Addressable", "", "/");
        repo.create(&document).await.unwrap();

        let prefix: String = document.id.as_str().chars().take(13).collect();
        let ids = repo
            .list_ids_by_prefix(&workspace_id, &prefix, 3)
            .await
            .unwrap();
        assert_eq!(ids, vec![document.id.as_str()]);
    }
}
