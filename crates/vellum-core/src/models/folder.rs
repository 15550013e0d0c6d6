//! Folder model and pathname helpers
//!
//! Folders form a rooted hierarchy addressed by slash-delimited pathnames
//! (`/parent/child`). The pathname is the folder's identity in the store;
//! sibling ordering is carried separately in `display_order`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::WorkspaceId;

/// A folder in a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Owning workspace
    pub workspace_id: WorkspaceId,
    /// Absolute slash-delimited pathname, e.g. `/projects/alpha`
    pub pathname: String,
    /// Position among siblings
    pub display_order: i64,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Folder {
    /// Create a new folder record at the given pathname
    #[must_use]
    pub fn new(workspace_id: WorkspaceId, pathname: impl Into<String>, display_order: i64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            workspace_id,
            pathname: pathname.into(),
            display_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pathname of the parent folder; `None` for top-level folders
    #[must_use]
    pub fn parent_pathname(&self) -> Option<String> {
        parent_pathname(&self.pathname)
    }

    /// Leaf name of this folder
    #[must_use]
    pub fn name(&self) -> &str {
        folder_name(&self.pathname)
    }
}

fn pathname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(/[^/\x00-\x1f]+)+$").expect("Invalid regex"))
}

/// Validate a folder pathname.
///
/// Valid pathnames start with `/`, have no empty, `.` or `..` segments,
/// no trailing slash, and no control characters. The bare root `/` is not
/// a folder pathname.
#[must_use]
pub fn is_valid_pathname(pathname: &str) -> bool {
    if !pathname_pattern().is_match(pathname) {
        return false;
    }
    pathname
        .split('/')
        .skip(1)
        .all(|segment| segment != "." && segment != ".." && !segment.trim().is_empty())
}

/// Pathname of the parent folder; `None` when the folder is top-level
#[must_use]
pub fn parent_pathname(pathname: &str) -> Option<String> {
    let (parent, _) = pathname.rsplit_once('/')?;
    if parent.is_empty() {
        None
    } else {
        Some(parent.to_string())
    }
}

/// Leaf name of a folder pathname
#[must_use]
pub fn folder_name(pathname: &str) -> &str {
    pathname.rsplit('/').next().unwrap_or(pathname)
}

/// Check whether `candidate` lies strictly below `ancestor`
#[must_use]
pub fn is_descendant_pathname(ancestor: &str, candidate: &str) -> bool {
    candidate.len() > ancestor.len() + 1 && candidate.starts_with(&format!("{ancestor}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pathnames() {
        assert!(is_valid_pathname("/a"));
        assert!(is_valid_pathname("/projects/alpha"));
        assert!(is_valid_pathname("/a b/c-d"));
    }

    #[test]
    fn invalid_pathnames() {
        assert!(!is_valid_pathname(""));
        assert!(!is_valid_pathname("/"));
        assert!(!is_valid_pathname("a/b"));
        assert!(!is_valid_pathname("/a/"));
        assert!(!is_valid_pathname("/a//b"));
        assert!(!is_valid_pathname("/a/../b"));
        assert!(!is_valid_pathname("/a/."));
        assert!(!is_valid_pathname("/a/\n"));
    }

    #[test]
    fn parent_pathname_walks_up_one_level() {
        assert_eq!(parent_pathname("/a/b/c"), Some("/a/b".to_string()));
        assert_eq!(parent_pathname("/a"), None);
    }

    #[test]
    fn folder_name_is_last_segment() {
        assert_eq!(folder_name("/a/b/c"), "c");
        assert_eq!(folder_name("/alpha"), "alpha");
    }

    #[test]
    fn descendant_check_requires_separator() {
        assert!(is_descendant_pathname("/a", "/a/b"));
        assert!(is_descendant_pathname("/a", "/a/b/c"));
        assert!(!is_descendant_pathname("/a", "/a"));
        assert!(!is_descendant_pathname("/a", "/ab"));
        assert!(!is_descendant_pathname("/a/b", "/a"));
    }

    #[test]
    fn folder_accessors() {
        let folder = Folder::new(WorkspaceId::new(), "/projects/alpha", 2);
        assert_eq!(folder.name(), "alpha");
        assert_eq!(folder.parent_pathname(), Some("/projects".to_string()));
        assert_eq!(folder.display_order, 2);
    }
}
