//! Data models for Vellum

mod document;
mod folder;
mod smart_view;
mod workspace;

pub use document::{normalize_tag, Document, DocumentId, PropValue};
pub use folder::{
    folder_name, is_descendant_pathname, is_valid_pathname, parent_pathname, Folder,
};
pub use smart_view::{Condition, PropOp, SmartView, SmartViewId};
pub use workspace::{Workspace, WorkspaceId};
