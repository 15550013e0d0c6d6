//! Smart view model
//!
//! A smart view is a saved filter condition over documents. The condition is
//! a serializable boolean expression tree; evaluation lives in `crate::query`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::PropValue;

/// A unique identifier for a smart view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SmartViewId(Uuid);

impl SmartViewId {
    /// Create a new unique smart view ID
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

impl Default for SmartViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SmartViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SmartViewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Comparison operator for property conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropOp {
    Eq,
    Contains,
    Gt,
    Lt,
}

/// A boolean condition over document fields.
///
/// Conditions nest through `And`/`Or`; the leaves compare a single field.
/// `And` over no conditions is the empty condition and matches every
/// document; `Or` over no conditions matches none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Tag { tag: String },
    InFolder { pathname: String },
    Bookmarked { bookmarked: bool },
    Prop { name: String, op: PropOp, value: PropValue },
}

impl Condition {
    /// The empty condition, matching every document
    #[must_use]
    pub const fn empty() -> Self {
        Self::And {
            conditions: Vec::new(),
        }
    }

    /// Whether this is the empty (match-all) condition
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::And { conditions } if conditions.is_empty())
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::empty()
    }
}

/// A saved smart view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartView {
    /// Unique identifier
    pub id: SmartViewId,
    /// Display name, unique per workspace
    pub name: String,
    /// Filter condition
    pub condition: Condition,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl SmartView {
    /// Create a new smart view with the given name and condition
    #[must_use]
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: SmartViewId::new(),
            name: name.into(),
            condition,
            created_at: now,
            updated_at: now,
        }
    }
}
