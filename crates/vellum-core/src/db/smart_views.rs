//! Smart view repository implementation

use crate::error::{Error, Result};
use crate::models::{Condition, SmartView, WorkspaceId};
use libsql::{params, Connection, Row};

/// Trait for smart view storage operations
#[allow(async_fn_in_trait)]
pub trait SmartViewRepository {
    /// Save a new smart view; names are unique per workspace
    async fn create(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
        condition: Condition,
    ) -> Result<SmartView>;

    /// List the smart views of a workspace, by name
    async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<SmartView>>;

    /// Look a smart view up by name
    async fn get_by_name(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> Result<Option<SmartView>>;

    /// Remove a smart view by name
    async fn remove(&self, workspace_id: &WorkspaceId, name: &str) -> Result<()>;
}

/// libSQL implementation of `SmartViewRepository`
pub struct LibSqlSmartViewRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSmartViewRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_smart_view(row: &Row) -> Result<SmartView> {
        let id: String = row.get(0)?;
        let condition: String = row.get(2)?;
        Ok(SmartView {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("invalid smart view id: {id}")))?,
            name: row.get(1)?,
            condition: serde_json::from_str(&condition)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl SmartViewRepository for LibSqlSmartViewRepository<'_> {
    async fn create(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
        condition: Condition,
    ) -> Result<SmartView> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Smart view name must not be empty".into()));
        }
        if self.get_by_name(workspace_id, name).await?.is_some() {
            return Err(Error::InvalidInput(format!(
                "Smart view name already in use: {name}"
            )));
        }

        let view = SmartView::new(name, condition);
        self.conn
            .execute(
                "INSERT INTO smart_views (id, workspace_id, name, condition, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    view.id.as_str(),
                    workspace_id.as_str(),
                    view.name.clone(),
                    serde_json::to_string(&view.condition)?,
                    view.created_at,
                    view.updated_at
                ],
            )
            .await?;

        Ok(view)
    }

    async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<SmartView>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, condition, created_at, updated_at
                 FROM smart_views WHERE workspace_id = ? ORDER BY name ASC",
                params![workspace_id.as_str()],
            )
            .await?;

        let mut views = Vec::new();
        while let Some(row) = rows.next().await? {
            views.push(Self::parse_smart_view(&row)?);
        }
        Ok(views)
    }

    async fn get_by_name(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> Result<Option<SmartView>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, condition, created_at, updated_at
                 FROM smart_views WHERE workspace_id = ? AND name = ?",
                params![workspace_id.as_str(), name],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_smart_view(&row)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, workspace_id: &WorkspaceId, name: &str) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM smart_views WHERE workspace_id = ? AND name = ?",
                params![workspace_id.as_str(), name],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(name.to_string()));
        }

        Ok(())
    }
}
