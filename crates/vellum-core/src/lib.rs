//! vellum-core - Core library for Vellum
//!
//! This crate contains the shared models, local document store, smart view
//! evaluation, folder tree reconciliation, and cloud API glue used by all
//! Vellum client surfaces.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod tree;

pub use error::{Error, Result};
pub use models::{Condition, Document, DocumentId, Folder, SmartView, Workspace, WorkspaceId};
