//! Document model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::WorkspaceId;

/// A unique identifier for a document, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new unique document ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A typed property value attached to a document.
///
/// Smart view conditions compare against these; a comparison between
/// mismatched variants never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropValue {
    Text(String),
    Number(i64),
    Bool(bool),
    /// Unix milliseconds
    Date(i64),
}

/// A document in a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,
    /// Owning workspace
    pub workspace_id: WorkspaceId,
    /// Display title
    pub title: String,
    /// Body content
    pub content: String,
    /// Pathname of the containing folder ("/" is the workspace root)
    pub folder_pathname: String,
    /// Lowercase tag names
    pub tags: Vec<String>,
    /// Typed properties, condition-matchable
    pub props: BTreeMap<String, PropValue>,
    /// Bookmark flag
    pub bookmarked: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for store re-sync
    pub is_deleted: bool,
}

impl Document {
    /// Create a new document in the given workspace folder
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        title: impl Into<String>,
        content: impl Into<String>,
        folder_pathname: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: DocumentId::new(),
            workspace_id,
            title: title.into(),
            content: content.into(),
            folder_pathname: folder_pathname.into(),
            tags: Vec::new(),
            props: BTreeMap::new(),
            bookmarked: false,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Attach a tag, normalized to lowercase; duplicates are ignored
    pub fn add_tag(&mut self, tag: impl AsRef<str>) {
        let tag = normalize_tag(tag.as_ref());
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Check whether the document carries the given tag (case-insensitive)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        self.tags.iter().any(|candidate| *candidate == tag)
    }

    /// Get first line of content as a preview, truncated to `max_len` characters
    #[must_use]
    pub fn content_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

/// Normalize a tag name: trimmed and lowercased
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}
