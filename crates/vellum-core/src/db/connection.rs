//! Database connection management

use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

use super::migrations;

/// Configuration for syncing the local replica with a remote store
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    /// Remote database URL (e.g., `libsql://workspace.example.io`)
    pub url: Option<String>,
    /// Authentication token for the remote database
    pub auth_token: Option<String>,
    /// Automatic sync interval; `None` means manual sync only
    pub sync_interval: Option<Duration>,
}

impl RemoteConfig {
    /// Create a new remote configuration with the default sync interval
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            auth_token: Some(auth_token.into()),
            sync_interval: Some(Duration::from_secs(60)),
        }
    }

    /// Set the automatic sync interval
    #[must_use]
    pub const fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Check if the remote side is configured
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.auth_token.is_some()
    }
}

/// Wrapper around a libSQL database holding the client's workspace data.
///
/// Local-only by default; with a [`RemoteConfig`] the local file becomes an
/// embedded replica of the remote store, and [`Database::sync`] is the
/// "refresh from the store's actual state" step after partial failures.
pub struct Database {
    db: LibSqlDatabase,
    conn: Connection,
    remote: Option<RemoteConfig>,
}

impl Database {
    /// Open a local-only database at the given path, creating it if needed.
    /// Runs migrations automatically.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        let conn = db.connect()?;

        let database = Self {
            db,
            conn,
            remote: None,
        };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;

        let database = Self {
            db,
            conn,
            remote: None,
        };
        database.configure().await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Open an embedded replica that syncs with the remote store.
    ///
    /// Reads are served locally; writes propagate to the remote and sync
    /// back.
    pub async fn open_with_replica(
        local_path: impl AsRef<Path>,
        remote: RemoteConfig,
    ) -> Result<Self> {
        let path_str = local_path.as_ref().to_string_lossy().to_string();

        let url = remote
            .url
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("Remote URL is required".into()))?;
        let token = remote
            .auth_token
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("Auth token is required".into()))?;

        let mut builder = Builder::new_remote_replica(&path_str, url.clone(), token.clone());
        if let Some(interval) = remote.sync_interval {
            builder = builder.sync_interval(interval);
        }

        let db = builder.build().await?;
        let conn = db.connect()?;

        let database = Self {
            db,
            conn,
            remote: Some(remote),
        };

        // Pull the remote schema first, then migrate on top of it.
        database.sync().await?;
        database.configure().await?;
        database.migrate().await?;

        Ok(database)
    }

    async fn configure(&self) -> Result<()> {
        // WAL and cache pragmas may be rejected by remote replicas.
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        self.conn.execute("PRAGMA foreign_keys = ON;", ()).await?;
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn).await
    }

    /// Sync with the remote store (if configured).
    ///
    /// For embedded replicas this pulls the store's current state, which is
    /// also how the client recovers after a partially applied rearrangement.
    pub async fn sync(&self) -> Result<()> {
        if self.remote.is_some() {
            self.db.sync().await?;
            tracing::debug!("local replica synced with remote store");
        }
        Ok(())
    }

    /// Check if a remote store is configured
    pub const fn is_replica(&self) -> bool {
        self.remote.is_some()
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn open_in_memory_is_local_only() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(!db.is_replica());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn open_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vellum.db");
        let db = Database::open(&path).await.unwrap();
        assert!(!db.is_replica());
        assert!(path.exists());
    }

    #[test]
    fn remote_config_new_is_configured() {
        let config = RemoteConfig::new("libsql://workspace.example.io", "token");
        assert!(config.is_configured());
        assert_eq!(config.sync_interval, Some(Duration::from_secs(60)));
    }

    #[test]
    fn remote_config_default_not_configured() {
        assert!(!RemoteConfig::default().is_configured());
    }
}
