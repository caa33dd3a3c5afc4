//! Error types for the position tree

use crate::node::PositionId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Parent not found: {0}")]
    ParentNotFound(PositionId),

    #[error("Duplicate position id: {0}")]
    DuplicateId(PositionId),

    #[error("Position {id} references unknown parent {parent}")]
    OrphanPosition { id: PositionId, parent: PositionId },

    #[error("{} position(s) unreachable from any root", .ids.len())]
    Unreachable { ids: Vec<PositionId> },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Structural rule violations. These block a mutation entirely.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Articles cannot contain other positions ({0})")]
    ArticleCannotHaveChildren(PositionId),

    #[error("Maximum nesting depth of {max} exceeded (would reach {depth})")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Cannot move a position into itself or one of its descendants")]
    CycleDetected,
}
