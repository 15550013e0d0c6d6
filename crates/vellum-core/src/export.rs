//! Shared document export helpers for client parity.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::Document;

/// Export output format shared by all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable document representation used in JSON and Markdown exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub id: String,
    pub title: String,
    pub folder_pathname: String,
    pub content: String,
    pub tags: Vec<String>,
    pub bookmarked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Convert a document into an export record with stable tag ordering.
#[must_use]
pub fn document_to_export_item(document: &Document) -> ExportDocument {
    let mut tags = document.tags.clone();
    tags.sort();

    ExportDocument {
        id: document.id.to_string(),
        title: document.title.clone(),
        folder_pathname: document.folder_pathname.clone(),
        content: document.content.clone(),
        tags,
        bookmarked: document.bookmarked,
        created_at: document.created_at,
        updated_at: document.updated_at,
    }
}

/// Render documents as pretty-printed JSON.
pub fn render_json_export(documents: &[Document]) -> serde_json::Result<String> {
    let items = documents
        .iter()
        .map(document_to_export_item)
        .collect::<Vec<ExportDocument>>();
    serde_json::to_string_pretty(&items)
}

/// Render documents in Markdown with frontmatter blocks.
#[must_use]
pub fn render_markdown_export(documents: &[Document]) -> String {
    let mut output = String::new();

    for (index, document) in documents.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = document_to_export_item(document);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", item.id);
        let _ = writeln!(output, "title: {}", item.title);
        let _ = writeln!(output, "folder: {}", item.folder_pathname);
        let _ = writeln!(output, "created_at: {}", item.created_at);
        let _ = writeln!(output, "updated_at: {}", item.updated_at);
        let _ = writeln!(output, "tags:");
        for tag in item.tags {
            let _ = writeln!(output, "  - {tag}");
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        output.push_str(&item.content);
        output.push('\n');
    }

    output
}

/// Render documents based on selected export format.
pub fn render_documents_export(
    documents: &[Document],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(documents),
        ExportFormat::Markdown => Ok(render_markdown_export(documents)),
    }
}
