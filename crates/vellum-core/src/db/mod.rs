//! Local document store for Vellum
//!
//! A libSQL database holding workspaces, folders, documents and saved smart
//! views, either local-only or as an embedded replica of the remote store.

mod connection;
mod documents;
mod folders;
mod migrations;
mod smart_views;
mod workspaces;

pub use connection::{Database, RemoteConfig};
pub use documents::{DocumentRepository, LibSqlDocumentRepository};
pub use folders::{FolderRepository, LibSqlFolderRepository};
pub use smart_views::{LibSqlSmartViewRepository, SmartViewRepository};
pub use workspaces::{LibSqlWorkspaceRepository, WorkspaceRepository};
