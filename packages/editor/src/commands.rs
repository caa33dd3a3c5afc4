//! # Edit Commands
//!
//! Explicit command objects for the two kinds of user edits:
//!
//! - [`MoveCommand`]: an accepted structural move plus the absolute
//!   ordering to persist. Dispatched in the background; a failure is
//!   reported with the command attached so it can be retried as is.
//! - [`FieldEditCommand`]: a field edit recorded in (or reverted from)
//!   the change store.

use crate::backend::PositionsBackend;
use crate::changes::ChangeTrackingStore;
use crate::notice::Notice;
use chrono::{DateTime, Utc};
use quotetree_tree::{MoveRequest, PositionField, PositionId, PositionUpdate};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Reorder payload for one accepted move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    /// Session-local sequence number
    pub id: u64,
    pub version_id: String,
    pub request: MoveRequest,
    pub updates: Vec<PositionUpdate>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied { command_id: u64 },
    Failed { command_id: u64, error: String },
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }
}

/// Send the reorder in the background.
///
/// The returned handle may be dropped; failures surface as
/// [`Notice::ReorderFailed`] either way. There is no local rollback.
pub fn dispatch_move(
    backend: Arc<dyn PositionsBackend>,
    command: MoveCommand,
    notices: UnboundedSender<Notice>,
) -> JoinHandle<CommandOutcome> {
    tokio::spawn(async move {
        let command_id = command.id;
        match backend.reorder(&command.version_id, &command.updates).await {
            Ok(()) => {
                debug!(command_id, updates = command.updates.len(), "Reorder persisted");
                CommandOutcome::Applied { command_id }
            }
            Err(err) => {
                warn!(command_id, error = %err, "Reorder failed");
                let error = err.to_string();
                // Receiver may already be gone if the session was dropped
                let _ = notices.send(Notice::ReorderFailed {
                    command,
                    reason: error.clone(),
                });
                CommandOutcome::Failed { command_id, error }
            }
        }
    })
}

/// A single field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEditCommand {
    pub position_id: PositionId,
    pub field: PositionField,
    pub old_value: String,
    pub new_value: String,
}

impl FieldEditCommand {
    pub fn apply(&self, store: &mut ChangeTrackingStore) {
        store.add_change(
            &self.position_id,
            self.field,
            self.old_value.as_str(),
            self.new_value.as_str(),
        );
    }

    /// Drop the pending entry, restoring the canonical value
    pub fn revert(&self, store: &mut ChangeTrackingStore) {
        store.remove_change(&self.position_id, Some(self.field));
    }
}
