//! Folder repository implementation
//!
//! Folders are keyed by (workspace, pathname). The repository is also the
//! store-side seam ([`FolderStore`]) the tree reconciler replays rename and
//! reorder descriptors against; `rename_folder` rejects occupied
//! destinations, which is why replay ordering matters.

#![allow(clippy::cast_possible_wrap)] // pathname lengths and counts fit i64

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{is_valid_pathname, parent_pathname, Folder, WorkspaceId};
use crate::tree::FolderStore;
use libsql::{params, Connection, Row};

/// Trait for folder storage operations
#[allow(async_fn_in_trait)]
pub trait FolderRepository {
    /// Create a folder, creating missing parent folders along the way.
    /// Returns the folder at the requested pathname.
    async fn create_folder(&self, workspace_id: &WorkspaceId, pathname: &str) -> Result<Folder>;

    /// Get a folder by pathname
    async fn get_folder(
        &self,
        workspace_id: &WorkspaceId,
        pathname: &str,
    ) -> Result<Option<Folder>>;

    /// List all folders of a workspace, ordered by pathname
    async fn list_folders(&self, workspace_id: &WorkspaceId) -> Result<Vec<Folder>>;

    /// Remove a folder and its descendants; documents inside are
    /// soft-deleted
    async fn remove_folder(&self, workspace_id: &WorkspaceId, pathname: &str) -> Result<()>;
}

/// libSQL implementation of `FolderRepository` and the reconciler's
/// `FolderStore` seam
pub struct LibSqlFolderRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlFolderRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_folder(row: &Row) -> Result<Folder> {
        let workspace_id: String = row.get(0)?;
        Ok(Folder {
            workspace_id: workspace_id
                .parse()
                .map_err(|_| Error::Database(format!("invalid workspace id: {workspace_id}")))?,
            pathname: row.get(1)?,
            display_order: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    async fn insert_folder(&self, folder: &Folder) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO folders (workspace_id, pathname, display_order, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    folder.workspace_id.as_str(),
                    folder.pathname.clone(),
                    folder.display_order,
                    folder.created_at,
                    folder.updated_at
                ],
            )
            .await?;
        Ok(())
    }

    /// Re-point documents after a folder pathname change.
    async fn repoint_documents(
        &self,
        workspace_id: &WorkspaceId,
        old_pathname: &str,
        new_pathname: &str,
        recursive: bool,
        now: i64,
    ) -> Result<()> {
        self.conn
            .execute(
                "UPDATE documents SET folder_pathname = ?, updated_at = ?
                 WHERE workspace_id = ? AND folder_pathname = ?",
                params![new_pathname, now, workspace_id.as_str(), old_pathname],
            )
            .await?;

        if recursive {
            let prefix_chars = old_pathname.chars().count() as i64;
            self.conn
                .execute(
                    "UPDATE documents
                     SET folder_pathname = ? || substr(folder_pathname, ?), updated_at = ?
                     WHERE workspace_id = ? AND folder_pathname LIKE ? || '/%'",
                    params![
                        new_pathname,
                        prefix_chars + 1,
                        now,
                        workspace_id.as_str(),
                        old_pathname
                    ],
                )
                .await?;
        }

        Ok(())
    }
}

impl FolderRepository for LibSqlFolderRepository<'_> {
    async fn create_folder(&self, workspace_id: &WorkspaceId, pathname: &str) -> Result<Folder> {
        if !is_valid_pathname(pathname) {
            return Err(Error::InvalidInput(format!(
                "Invalid folder pathname: {pathname}"
            )));
        }

        let existing = self.list_folders(workspace_id).await?;
        let mut sibling_counts: HashMap<Option<String>, i64> = HashMap::new();
        for folder in &existing {
            *sibling_counts
                .entry(parent_pathname(&folder.pathname))
                .or_default() += 1;
        }
        let known: HashMap<&str, &Folder> =
            existing.iter().map(|f| (f.pathname.as_str(), f)).collect();

        // Walk the ancestor chain top-down, creating whatever is missing.
        let mut missing = Vec::new();
        let mut cursor = Some(pathname.to_string());
        while let Some(current) = cursor {
            if known.contains_key(current.as_str()) {
                break;
            }
            cursor = parent_pathname(&current);
            missing.push(current);
        }

        for current in missing.iter().rev() {
            let parent = parent_pathname(current);
            let display_order = sibling_counts.get(&parent).copied().unwrap_or(0);
            *sibling_counts.entry(parent).or_default() += 1;

            let folder = Folder::new(*workspace_id, current.clone(), display_order);
            self.insert_folder(&folder).await?;
        }

        self.get_folder(workspace_id, pathname)
            .await?
            .ok_or_else(|| Error::NotFound(pathname.to_string()))
    }

    async fn get_folder(
        &self,
        workspace_id: &WorkspaceId,
        pathname: &str,
    ) -> Result<Option<Folder>> {
        let mut rows = self
            .conn
            .query(
                "SELECT workspace_id, pathname, display_order, created_at, updated_at
                 FROM folders WHERE workspace_id = ? AND pathname = ?",
                params![workspace_id.as_str(), pathname],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_folder(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_folders(&self, workspace_id: &WorkspaceId) -> Result<Vec<Folder>> {
        let mut rows = self
            .conn
            .query(
                "SELECT workspace_id, pathname, display_order, created_at, updated_at
                 FROM folders WHERE workspace_id = ? ORDER BY pathname ASC",
                params![workspace_id.as_str()],
            )
            .await?;

        let mut folders = Vec::new();
        while let Some(row) = rows.next().await? {
            folders.push(Self::parse_folder(&row)?);
        }
        Ok(folders)
    }

    async fn remove_folder(&self, workspace_id: &WorkspaceId, pathname: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let removed = self
            .conn
            .execute(
                "DELETE FROM folders
                 WHERE workspace_id = ? AND (pathname = ? OR pathname LIKE ? || '/%')",
                params![workspace_id.as_str(), pathname, pathname],
            )
            .await?;

        if removed == 0 {
            return Err(Error::NotFound(pathname.to_string()));
        }

        self.conn
            .execute(
                "UPDATE documents SET is_deleted = 1, updated_at = ?
                 WHERE workspace_id = ?
                   AND (folder_pathname = ? OR folder_pathname LIKE ? || '/%')",
                params![now, workspace_id.as_str(), pathname, pathname],
            )
            .await?;

        Ok(())
    }
}

impl FolderStore for LibSqlFolderRepository<'_> {
    async fn rename_folder(
        &self,
        workspace_id: &WorkspaceId,
        old_pathname: &str,
        new_pathname: &str,
        recursive: bool,
        display_order: i64,
    ) -> Result<()> {
        if !is_valid_pathname(new_pathname) {
            return Err(Error::InvalidInput(format!(
                "Invalid folder pathname: {new_pathname}"
            )));
        }
        if self.get_folder(workspace_id, old_pathname).await?.is_none() {
            return Err(Error::NotFound(old_pathname.to_string()));
        }
        if self.get_folder(workspace_id, new_pathname).await?.is_some() {
            return Err(Error::DuplicatePathname(new_pathname.to_string()));
        }

        let now = chrono::Utc::now().timestamp_millis();
        tracing::debug!(%old_pathname, %new_pathname, recursive, "renaming folder");

        self.conn
            .execute(
                "UPDATE folders SET pathname = ?, display_order = ?, updated_at = ?
                 WHERE workspace_id = ? AND pathname = ?",
                params![
                    new_pathname,
                    display_order,
                    now,
                    workspace_id.as_str(),
                    old_pathname
                ],
            )
            .await?;

        if recursive {
            let prefix_chars = old_pathname.chars().count() as i64;
            self.conn
                .execute(
                    "UPDATE folders SET pathname = ? || substr(pathname, ?), updated_at = ?
                     WHERE workspace_id = ? AND pathname LIKE ? || '/%'",
                    params![
                        new_pathname,
                        prefix_chars + 1,
                        now,
                        workspace_id.as_str(),
                        old_pathname
                    ],
                )
                .await?;
        }

        self.repoint_documents(workspace_id, old_pathname, new_pathname, recursive, now)
            .await
    }

    async fn reorder_folder(
        &self,
        workspace_id: &WorkspaceId,
        pathname: &str,
        display_order: i64,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE folders SET display_order = ?, updated_at = ?
                 WHERE workspace_id = ? AND pathname = ?",
                params![display_order, now, workspace_id.as_str(), pathname],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(pathname.to_string()));
        }

        Ok(())
    }
}
