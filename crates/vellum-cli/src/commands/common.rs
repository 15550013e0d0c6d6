use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use vellum_core::config::ClientConfig;
use vellum_core::db::{
    Database, DocumentRepository, LibSqlDocumentRepository, LibSqlWorkspaceRepository,
    WorkspaceRepository,
};
use vellum_core::models::Condition;
use vellum_core::{Document, DocumentId, Workspace};

use crate::error::CliError;

/// Workspace used when `--workspace` is not given.
pub const DEFAULT_WORKSPACE: &str = "main";

#[derive(Debug, Serialize)]
pub struct DocListItem {
    pub id: String,
    pub title: String,
    pub folder: String,
    pub bookmarked: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("VELLUM_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vellum")
        .join("vellum.db")
}

pub async fn open_database(path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = ClientConfig::from_env();
    if let Some(remote) = config.remote_config() {
        tracing::info!("opening local replica of remote store");
        Ok(Database::open_with_replica(path, remote).await?)
    } else {
        Ok(Database::open(path).await?)
    }
}

/// Resolve the target workspace by name.
///
/// The default workspace is created on first use; an explicitly named
/// workspace must already exist.
pub async fn resolve_workspace(
    db: &Database,
    name: Option<&str>,
) -> Result<Workspace, CliError> {
    let repo = LibSqlWorkspaceRepository::new(db.connection());

    match name {
        Some(name) => repo
            .get_by_name(name)
            .await?
            .ok_or_else(|| CliError::WorkspaceNotFound(name.to_string())),
        None => {
            if let Some(workspace) = repo.get_by_name(DEFAULT_WORKSPACE).await? {
                Ok(workspace)
            } else {
                Ok(repo.create(DEFAULT_WORKSPACE).await?)
            }
        }
    }
}

/// Resolve a document by exact ID or unique ID prefix.
pub async fn resolve_document(
    db: &Database,
    workspace: &Workspace,
    document_query: &str,
) -> Result<Document, CliError> {
    let document_query = document_query.trim();
    if document_query.is_empty() {
        return Err(CliError::DocumentNotFound(document_query.to_string()));
    }

    let repo = LibSqlDocumentRepository::new(db.connection());

    if let Ok(document_id) = document_query.parse::<DocumentId>() {
        if let Some(document) = repo.get(&document_id).await? {
            return Ok(document);
        }
    }

    let matching_ids = repo
        .list_ids_by_prefix(&workspace.id, document_query, 3)
        .await?;

    match matching_ids.len() {
        0 => Err(CliError::DocumentNotFound(document_query.to_string())),
        1 => {
            let resolved_id = matching_ids[0]
                .parse::<DocumentId>()
                .map_err(|_| CliError::DocumentNotFound(document_query.to_string()))?;
            repo.get(&resolved_id)
                .await?
                .ok_or_else(|| CliError::DocumentNotFound(document_query.to_string()))
        }
        _ => {
            let options = matching_ids
                .iter()
                .take(3)
                .map(|id| id.chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousDocumentId(format!(
                "ID prefix '{document_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Parse a `--condition` argument: inline JSON, or `@path` to a JSON file.
pub fn parse_condition_arg(raw: &str) -> Result<Condition, CliError> {
    let payload = if let Some(path) = raw.strip_prefix('@') {
        std::fs::read_to_string(path)?
    } else {
        raw.to_string()
    };

    serde_json::from_str(&payload).map_err(|error| CliError::InvalidCondition(error.to_string()))
}

pub fn format_document_lines(documents: &[Document]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    documents
        .iter()
        .map(|document| {
            let id = document.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let title = title_preview(document, 32);
            let marker = if document.bookmarked { "*" } else { " " };
            let relative_time = format_relative_time(document.updated_at, now_ms);
            let tags = render_tags(document);

            if tags.is_empty() {
                format!("{short_id:<13} {marker} {title:<32}  {relative_time}")
            } else {
                format!("{short_id:<13} {marker} {title:<32}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn document_to_list_item(document: &Document) -> DocListItem {
    let now_ms = Utc::now().timestamp_millis();
    let mut tags = document.tags.clone();
    tags.sort();

    DocListItem {
        id: document.id.to_string(),
        title: document.title.clone(),
        folder: document.folder_pathname.clone(),
        bookmarked: document.bookmarked,
        created_at: document.created_at,
        updated_at: document.updated_at,
        relative_time: format_relative_time(document.updated_at, now_ms),
        tags,
    }
}

pub fn title_preview(document: &Document, max_chars: usize) -> String {
    let collapsed = document
        .title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

fn render_tags(document: &Document) -> String {
    let mut tags = document.tags.clone();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
