//! Error types for the editor

use quotetree_tree::{PositionId, TreeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Backend error: {0}")]
    Backend(#[from] crate::backend::BackendError),

    #[error("Not in edit mode")]
    NotEditing,

    #[error("Locked by {}", .locked_by.as_deref().unwrap_or("another user"))]
    LockedByOther { locked_by: Option<String> },

    #[error("Edit lock was lost; pending changes were kept")]
    LockLost,

    #[error("Position not found: {0}")]
    PositionNotFound(PositionId),
}
