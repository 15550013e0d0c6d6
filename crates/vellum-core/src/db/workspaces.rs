//! Workspace repository implementation

use crate::error::{Error, Result};
use crate::models::{Workspace, WorkspaceId};
use libsql::{params, Connection, Row};

/// Trait for workspace storage operations
#[allow(async_fn_in_trait)]
pub trait WorkspaceRepository {
    /// Create a new workspace
    async fn create(&self, name: &str) -> Result<Workspace>;

    /// Get a workspace by ID
    async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>>;

    /// Get a workspace by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Workspace>>;

    /// List all workspaces, oldest first
    async fn list(&self) -> Result<Vec<Workspace>>;

    /// Rename a workspace
    async fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> Result<Workspace>;

    /// Remove a workspace together with its folders and documents
    async fn remove_workspace(&self, id: &WorkspaceId) -> Result<()>;
}

/// libSQL implementation of `WorkspaceRepository`
pub struct LibSqlWorkspaceRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlWorkspaceRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_workspace(row: &Row) -> Result<Workspace> {
        let id: String = row.get(0)?;
        Ok(Workspace {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("invalid workspace id: {id}")))?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

fn normalized_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Workspace name must not be empty".into()));
    }
    Ok(name)
}

impl WorkspaceRepository for LibSqlWorkspaceRepository<'_> {
    async fn create(&self, name: &str) -> Result<Workspace> {
        let name = normalized_name(name)?;
        if self.get_by_name(name).await?.is_some() {
            return Err(Error::InvalidInput(format!(
                "Workspace name already in use: {name}"
            )));
        }

        let workspace = Workspace::new(name);
        self.conn
            .execute(
                "INSERT INTO workspaces (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
                params![
                    workspace.id.as_str(),
                    workspace.name.clone(),
                    workspace.created_at,
                    workspace.updated_at
                ],
            )
            .await?;

        Ok(workspace)
    }

    async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, created_at, updated_at FROM workspaces WHERE id = ?",
                params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_workspace(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Workspace>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, created_at, updated_at FROM workspaces WHERE name = ?",
                params![name],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_workspace(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, created_at, updated_at FROM workspaces ORDER BY created_at ASC",
                (),
            )
            .await?;

        let mut workspaces = Vec::new();
        while let Some(row) = rows.next().await? {
            workspaces.push(Self::parse_workspace(&row)?);
        }
        Ok(workspaces)
    }

    async fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> Result<Workspace> {
        let name = normalized_name(name)?;
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE workspaces SET name = ?, updated_at = ? WHERE id = ?",
                params![name, now, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.get(id).await?.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn remove_workspace(&self, id: &WorkspaceId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM workspaces WHERE id = ?", params![id.as_str()])
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
    use crate::db::Database;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_and_get() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        let workspace = repo.create("Personal").await.unwrap();
        let fetched = repo.get(&workspace.id).await.unwrap().unwrap();
        assert_eq!(fetched, workspace);

        let by_name = repo.get_by_name("Personal").await.unwrap().unwrap();
        assert_eq!(by_name.id, workspace.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_rejects_duplicate_name() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        repo.create("Team").await.unwrap();
        let error = repo.create("Team").await.unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_rejects_blank_name() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        assert!(repo.create("   ").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_updates_name() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        let workspace = repo.create("Old name").await.unwrap();
        let renamed = repo.rename_workspace(&workspace.id, "New name").await.unwrap();
        assert_eq!(renamed.name, "New name");
        assert!(renamed.updated_at >= workspace.updated_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_missing_workspace_fails() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        let error = repo
            .rename_workspace(&WorkspaceId::new(), "Anything")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remove_deletes_workspace() {
        let db = setup().await;
        let repo = LibSqlWorkspaceRepository::new(db.connection());

        let workspace = repo.create("Disposable").await.unwrap();
        repo.remove_workspace(&workspace.id).await.unwrap();
        assert!(repo.get(&workspace.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
