//! # Tree Editing Session
//!
//! Binds one quote version's position tree, its pending field edits and
//! its edit lock to a [`PositionsBackend`].
//!
//! A session owns canonical state (the tree), pending state (the change
//! store) and lock state. Moves apply locally and persist in the
//! background; field edits stay pending until [`TreeEditingSession::save`].
//! Anything the user should hear about arrives on the notice channel
//! returned by [`TreeEditingSession::open`].

use crate::backend::{BackendError, LockInfo, LockResource, NewPosition, PositionsBackend};
use crate::changes::ChangeTrackingStore;
use crate::commands::{dispatch_move, CommandOutcome, FieldEditCommand, MoveCommand};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::lock::{EditLock, LockState};
use crate::notice::Notice;
use crate::overlay::{DetailsPanel, FieldOverlay, FieldView};
use crate::view::{tree_rows, TreeRow};
use chrono::Utc;
use quotetree_tree::{
    MoveRequest, PositionField, PositionId, PositionKind, PositionNode, PositionTree, TreeError,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    Saved {
        changes: usize,
        /// Whether the lock release after saving went through
        released: bool,
    },
}

pub struct TreeEditingSession {
    version_id: String,
    config: EditorConfig,
    backend: Arc<dyn PositionsBackend>,
    tree: PositionTree,
    changes: ChangeTrackingStore,
    lock: EditLock,
    selection: Option<PositionId>,
    notices: mpsc::UnboundedSender<Notice>,
    next_command_id: u64,
}

impl TreeEditingSession {
    /// Load positions and lock state for `version_id`
    pub async fn open(
        backend: Arc<dyn PositionsBackend>,
        config: EditorConfig,
        version_id: impl Into<String>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notice>), EditorError> {
        let version_id = version_id.into();
        let records = backend.fetch_positions(&version_id).await?;
        let tree = PositionTree::from_records_with_limits(records, config.limits())?;

        let resource = LockResource::new(&config.resource_type, &version_id);
        let mut lock = EditLock::new(resource.clone());
        lock.refresh(backend.lock_info(&resource).await?);

        let (notices, receiver) = mpsc::unbounded_channel();
        info!(
            version_id = %version_id,
            positions = tree.len(),
            lock = ?lock.state(),
            "Opened editing session"
        );

        let session = Self {
            version_id,
            config,
            backend,
            tree,
            changes: ChangeTrackingStore::new(),
            lock,
            selection: None,
            notices,
            next_command_id: 0,
        };
        Ok((session, receiver))
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Canonical tree, without pending field edits
    pub fn tree(&self) -> &PositionTree {
        &self.tree
    }

    pub fn changes(&self) -> &ChangeTrackingStore {
        &self.changes
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.changes.has_changes()
    }

    pub fn lock(&self) -> &EditLock {
        &self.lock
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn subscribe_lock(&self) -> watch::Receiver<LockState> {
        self.lock.subscribe()
    }

    pub fn is_editing(&self) -> bool {
        self.lock.is_editing()
    }

    pub fn can_edit(&self) -> bool {
        self.lock.can_edit()
    }

    fn notify(&self, notice: Notice) {
        debug!(notice = %notice, "Notice");
        // Host may have dropped the receiver; notices are best effort
        let _ = self.notices.send(notice);
    }

    fn require_editing(&self) -> Result<(), EditorError> {
        match self.lock.state() {
            LockState::LockedByMe => Ok(()),
            LockState::LockedByOther => Err(EditorError::LockedByOther {
                locked_by: self.lock.locked_by_name().map(str::to_string),
            }),
            LockState::Unlocked | LockState::Acquiring => Err(EditorError::NotEditing),
        }
    }

    fn reject(&self, err: TreeError) -> EditorError {
        self.notify(Notice::Rejected {
            reason: err.to_string(),
        });
        err.into()
    }

    async fn load_positions(&mut self) -> Result<(), EditorError> {
        let records = self.backend.fetch_positions(&self.version_id).await?;
        self.tree = PositionTree::from_records_with_limits(records, self.config.limits())?;

        let dropped = self.changes.forget_missing(&self.tree);
        if dropped > 0 {
            debug!(dropped, "Dropped pending changes for vanished positions");
        }
        if let Some(selected) = &self.selection {
            if !self.tree.contains(selected.as_str()) {
                self.selection = None;
            }
        }
        Ok(())
    }

    /// Re-fetch positions and lock state
    pub async fn reload(&mut self) -> Result<(), EditorError> {
        self.load_positions().await?;
        let info = self.backend.lock_info(self.lock.resource()).await?;
        self.lock.refresh(info);
        info!(version_id = %self.version_id, positions = self.tree.len(), "Reloaded positions");
        self.notify(Notice::Reloaded);
        Ok(())
    }

    /// Adopt lock state pushed by the server
    pub fn lock_changed(&mut self, info: LockInfo) {
        let was_editing = self.lock.is_editing();
        self.lock.refresh(info);
        if was_editing && !self.lock.is_editing() {
            warn!(version_id = %self.version_id, "Edit lock taken away");
            self.notify(Notice::LockLost);
        }
    }

    /// Try to enter edit mode. `Ok(false)` when someone else holds the lock.
    pub async fn enter_edit(&mut self) -> Result<bool, EditorError> {
        if self.lock.is_editing() {
            return Ok(true);
        }

        self.lock.begin_enter();
        let info = match self.backend.acquire_lock(self.lock.resource()).await {
            Ok(info) => info,
            Err(err) => {
                warn!(version_id = %self.version_id, error = %err, "Lock acquire failed");
                self.lock.acquire_failed();
                self.notify(Notice::LockAcquireFailed {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };

        match self.lock.acquire_succeeded(info) {
            LockState::LockedByMe => {
                info!(version_id = %self.version_id, "Entered edit mode");
                self.notify(Notice::LockAcquired);
                if self.config.reload_on_enter {
                    if let Err(err) = self.load_positions().await {
                        warn!(error = %err, "Reload on enter failed");
                        self.notify(Notice::ReloadFailed {
                            reason: err.to_string(),
                        });
                    }
                }
                Ok(true)
            }
            LockState::LockedByOther => {
                self.notify(Notice::LockDenied {
                    locked_by: self.lock.locked_by_name().map(str::to_string),
                });
                Ok(false)
            }
            LockState::Unlocked | LockState::Acquiring => {
                self.notify(Notice::LockAcquireFailed {
                    reason: "lock was not granted".to_string(),
                });
                Ok(false)
            }
        }
    }

    /// Leave edit mode. The flip is immediate; a failed release only produces
    /// a notice. Returns whether the server confirmed the release.
    pub async fn exit_edit(&mut self) -> bool {
        if !self.lock.is_locked_by_current_user() {
            return true;
        }

        self.lock.begin_exit();
        match self.backend.release_lock(self.lock.resource()).await {
            Ok(info) => {
                info!(version_id = %self.version_id, "Left edit mode");
                self.lock.release_finished(info);
                true
            }
            Err(err) => {
                warn!(version_id = %self.version_id, error = %err, "Lock release failed");
                self.notify(Notice::LockReleaseFailed {
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    /// Apply a move locally and persist the new order in the background.
    ///
    /// Returns `None` when none of the dragged ids exist. The handle may be
    /// dropped; a failed reorder shows up as [`Notice::ReorderFailed`].
    pub fn move_positions(
        &mut self,
        request: MoveRequest,
    ) -> Result<Option<JoinHandle<CommandOutcome>>, EditorError> {
        self.require_editing()?;

        let outcome = match self.tree.move_positions(&request) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.reject(err)),
        };
        if outcome.is_noop() {
            return Ok(None);
        }
        self.tree = outcome.tree;

        self.next_command_id += 1;
        let command = MoveCommand {
            id: self.next_command_id,
            version_id: self.version_id.clone(),
            request,
            updates: self.tree.renumber(),
            issued_at: Utc::now(),
        };
        debug!(
            command_id = command.id,
            moved = ?outcome.moved,
            "Dispatching reorder"
        );
        Ok(Some(dispatch_move(
            Arc::clone(&self.backend),
            command,
            self.notices.clone(),
        )))
    }

    /// Send a failed reorder again.
    ///
    /// Reorder payloads are absolute, so the command carries the current
    /// local order rather than the one it was issued with.
    pub fn retry(&self, mut command: MoveCommand) -> JoinHandle<CommandOutcome> {
        command.updates = self.tree.renumber();
        command.issued_at = Utc::now();
        debug!(command_id = command.id, "Retrying reorder");
        dispatch_move(Arc::clone(&self.backend), command, self.notices.clone())
    }

    pub fn edit_field(
        &mut self,
        position_id: &str,
        field: PositionField,
        value: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.require_editing()?;
        let node = self
            .tree
            .locate(position_id)
            .ok_or_else(|| EditorError::PositionNotFound(position_id.into()))?;

        FieldEditCommand {
            position_id: node.id.clone(),
            field,
            old_value: node.field(field).to_string(),
            new_value: value.into(),
        }
        .apply(&mut self.changes);
        Ok(())
    }

    /// Discard the pending value of one field
    pub fn revert_field(&mut self, position_id: &str, field: PositionField) {
        self.changes.remove_change(&position_id.into(), Some(field));
    }

    fn overlay(&self) -> FieldOverlay<'_> {
        FieldOverlay::new(&self.tree, &self.changes)
    }

    /// Field value as the user sees it
    pub fn field(&self, position_id: &str, field: PositionField) -> Option<FieldView> {
        self.overlay().resolve(position_id, field)
    }

    pub fn details(&self, position_id: &str) -> Option<DetailsPanel> {
        self.overlay().details(position_id)
    }

    pub fn tree_view(&self) -> Vec<TreeRow> {
        tree_rows(&self.tree, self.overlay(), self.selection.as_ref())
    }

    pub fn select(&mut self, position_id: Option<&str>) -> Result<(), EditorError> {
        self.selection = match position_id {
            None => None,
            Some(id) => {
                let node = self
                    .tree
                    .locate(id)
                    .ok_or_else(|| EditorError::PositionNotFound(id.into()))?;
                Some(node.id.clone())
            }
        };
        Ok(())
    }

    pub fn selection(&self) -> Option<&PositionId> {
        self.selection.as_ref()
    }

    /// Create a position at the end of `parent`'s children and select it
    pub async fn add_position(
        &mut self,
        kind: PositionKind,
        parent: Option<&str>,
        title: impl Into<String>,
    ) -> Result<PositionId, EditorError> {
        self.require_editing()?;

        let parent_id = parent.map(PositionId::from);
        if let Err(err) = self.tree.check_target(parent_id.as_ref(), 1) {
            return Err(self.reject(err));
        }

        let request = NewPosition {
            kind,
            parent_id: parent_id.clone(),
            title: title.into(),
        };
        let record = self.backend.add_position(&self.version_id, &request).await?;

        let id = record.id.clone();
        let node = PositionNode::new(record.id, record.title, record.kind)
            .with_description(record.description);
        if let Err(err) = self.tree.insert(node, parent_id.as_ref(), None) {
            // The server already has the node; local state is stale
            warn!(position = %id, error = %err, "Added position does not fit the local tree");
            let err = self.reject(err);
            if let Err(reload_err) = self.reload().await {
                self.notify(Notice::ReloadFailed {
                    reason: reload_err.to_string(),
                });
            }
            return Err(err);
        }
        self.selection = Some(id.clone());

        info!(position = %id, kind = kind.as_str(), "Added position");
        Ok(id)
    }

    /// Submit pending field edits, then release the lock.
    ///
    /// An empty store makes no server call. A lost lock drops the session
    /// into read mode and keeps every pending edit.
    pub async fn save(&mut self) -> Result<SaveOutcome, EditorError> {
        self.require_editing()?;

        let changes = self.changes.get_changes_for_save();
        if changes.is_empty() {
            self.notify(Notice::NothingToSave);
            return Ok(SaveOutcome::NothingToSave);
        }

        let records = match self.backend.save_changes(&self.version_id, &changes).await {
            Ok(records) => records,
            Err(BackendError::LockConflict(reason)) => {
                warn!(version_id = %self.version_id, %reason, "Lock lost while saving");
                self.lock.force_unlock();
                self.notify(Notice::LockLost);
                return Err(EditorError::LockLost);
            }
            Err(err) => {
                warn!(version_id = %self.version_id, error = %err, "Save failed");
                self.notify(Notice::SaveFailed {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };

        self.tree.merge_records(&records);
        for change in &changes {
            let echoed = records.iter().any(|record| record.id == change.position_id);
            if !echoed {
                if let Some(node) = self.tree.locate_mut(change.position_id.as_str()) {
                    node.set_field(change.field, change.new_value.as_str());
                }
            }
        }
        self.changes.clear_all_changes();
        info!(version_id = %self.version_id, changes = changes.len(), "Saved changes");
        self.notify(Notice::Saved {
            changes: changes.len(),
        });

        let released = self.exit_edit().await;
        Ok(SaveOutcome::Saved {
            changes: changes.len(),
            released,
        })
    }

    /// Drop every pending edit and leave edit mode
    pub async fn cancel(&mut self) {
        if self.changes.has_changes() {
            debug!(pending = self.changes.len(), "Discarding pending changes");
        }
        self.changes.clear_all_changes();
        self.exit_edit().await;
    }
}
