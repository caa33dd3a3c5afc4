//! # Quote Tree Editor
//!
//! Editing core for quote position trees: pending field edits, the
//! advisory edit lock and the session that ties them to a backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ backend: PositionsBackend (fetch, reorder,  │
//! │          save, add, lock)                   │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ session: TreeEditingSession                 │
//! │  - PositionTree (canonical)                 │
//! │  - ChangeTrackingStore (pending fields)     │
//! │  - EditLock (optimistic advisory lock)      │
//! │  - notices → host UI                        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ overlay / view: what renderers display      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Canonical vs pending**: field edits never touch the tree until saved
//! 2. **Validate before mutate**: rejected moves leave the tree untouched
//! 3. **Optimistic lock**: the UI flips first, the server confirms or reverts
//! 4. **Fire and forget ordering**: reorders persist in the background and
//!    report failures as notices, without rollback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quotetree_editor::{EditorConfig, MoveRequest, PositionField, TreeEditingSession};
//!
//! let (mut session, mut notices) =
//!     TreeEditingSession::open(backend, EditorConfig::default(), "version-1").await?;
//!
//! session.enter_edit().await?;
//! session.move_positions(MoveRequest::new(["y"], None::<&str>, 0))?;
//! session.edit_field("x", PositionField::Title, "Hardware")?;
//! session.save().await?;
//!
//! while let Ok(notice) = notices.try_recv() {
//!     println!("{notice}");
//! }
//! ```

mod backend;
mod changes;
mod commands;
mod config;
mod errors;
mod lock;
mod memory;
mod notice;
mod overlay;
mod session;
mod view;

pub use backend::{BackendError, LockInfo, LockResource, NewPosition, PositionsBackend};
pub use changes::{ChangeRecord, ChangeTrackingStore, FieldChange};
pub use commands::{dispatch_move, CommandOutcome, FieldEditCommand, MoveCommand};
pub use config::{EditorConfig, DEFAULT_RESOURCE_TYPE};
pub use errors::EditorError;
pub use lock::{EditLock, LockState};
pub use memory::{BackendUser, InMemoryBackend, InMemoryServer, Operation};
pub use notice::{Notice, NoticeLevel};
pub use overlay::{editable_fields, DetailsPanel, FieldOverlay, FieldView};
pub use session::{SaveOutcome, TreeEditingSession};
pub use view::{tree_rows, TreeRow};

// Re-export tree types for convenience
pub use quotetree_tree::{
    MoveOutcome, MoveRequest, PositionField, PositionId, PositionKind, PositionNode,
    PositionRecord, PositionTree, PositionUpdate, TreeError, TreeLimits, ValidationError,
};
