use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vellum_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] vellum_core::api::ApiError),
    #[error("Document title cannot be empty")]
    EmptyTitle,
    #[error("Document not found for id/prefix: {0}")]
    DocumentNotFound(String),
    #[error("{0}")]
    AmbiguousDocumentId(String),
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),
    #[error("Smart view not found: {0}")]
    ViewNotFound(String),
    #[error("Invalid smart view condition: {0}")]
    InvalidCondition(String),
    #[error("Cloud API is not configured. Set VELLUM_API_URL (and VELLUM_API_TOKEN) to enable team operations.")]
    ApiNotConfigured,
    #[error("Remote sync is not configured. Set VELLUM_REMOTE_URL and VELLUM_REMOTE_TOKEN to enable `vellum sync`.")]
    SyncNotConfigured,
    #[error("Another rearrangement is already in flight")]
    RearrangementInFlight,
    #[error("Refusing to remove workspace '{0}' without --yes")]
    RemovalNotConfirmed(String),
}
