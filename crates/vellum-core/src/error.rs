//! Error types for vellum-core

use thiserror::Error;

/// Result type alias using vellum-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vellum-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two folders would occupy the same pathname
    #[error("Duplicate folder pathname: {0}")]
    DuplicatePathname(String),

    /// A backing store operation failed mid-sequence
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
