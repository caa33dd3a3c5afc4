//! # Edit Lock
//!
//! Client side of the optimistic advisory lock on a quote version.
//!
//! ```text
//!              begin_enter                acquire_succeeded (ours)
//!  Unlocked ───────────────▶ Acquiring ─────────────────────────▶ LockedByMe
//!     ▲                         │  │                                  │
//!     │      acquire_failed     │  │ acquire_succeeded (theirs)       │ begin_exit
//!     └─────────────────────────┘  ▼                                  │ force_unlock
//!     ▲                       LockedByOther                           │
//!     └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Acquiring` already reports as locked by the current user, so the UI
//! flips to edit mode before the server answers. The current state is
//! published on a `watch` channel.

use crate::backend::{LockInfo, LockResource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LockState {
    Unlocked,
    /// Optimistically held, waiting for the server
    Acquiring,
    LockedByMe,
    LockedByOther,
}

impl LockState {
    pub fn is_held_by_me(self) -> bool {
        matches!(self, LockState::Acquiring | LockState::LockedByMe)
    }
}

#[derive(Debug)]
pub struct EditLock {
    resource: LockResource,
    info: LockInfo,
    state: watch::Sender<LockState>,
}

impl EditLock {
    pub fn new(resource: LockResource) -> Self {
        let (state, _) = watch::channel(LockState::Unlocked);
        Self {
            info: LockInfo::unlocked(&resource),
            resource,
            state,
        }
    }

    pub fn resource(&self) -> &LockResource {
        &self.resource
    }

    pub fn state(&self) -> LockState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<LockState> {
        self.state.subscribe()
    }

    /// Last lock info adopted from the server
    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    fn transition(&self, next: LockState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(
                resource = %self.resource.resource_id,
                ?previous,
                ?next,
                "Lock state changed"
            );
        }
    }

    fn state_for(info: &LockInfo) -> LockState {
        match (info.is_locked, info.is_locked_by_current_user) {
            (false, _) => LockState::Unlocked,
            (true, true) => LockState::LockedByMe,
            (true, false) => LockState::LockedByOther,
        }
    }

    /// Optimistic flip before the acquire request goes out
    pub fn begin_enter(&mut self) {
        self.transition(LockState::Acquiring);
    }

    /// Server answered the acquire request
    pub fn acquire_succeeded(&mut self, info: LockInfo) -> LockState {
        let next = Self::state_for(&info);
        self.info = info;
        self.transition(next);
        next
    }

    /// Acquire request failed outright; revert
    pub fn acquire_failed(&mut self) {
        self.info = LockInfo::unlocked(&self.resource);
        self.transition(LockState::Unlocked);
    }

    /// Optimistic flip before the release request goes out
    pub fn begin_exit(&mut self) {
        self.info = LockInfo::unlocked(&self.resource);
        self.transition(LockState::Unlocked);
    }

    /// Release confirmed by the server
    pub fn release_finished(&mut self, info: LockInfo) {
        self.refresh(info);
    }

    /// The server says our lock is gone
    pub fn force_unlock(&mut self) {
        self.info = LockInfo::unlocked(&self.resource);
        self.transition(LockState::Unlocked);
    }

    /// Adopt server state
    pub fn refresh(&mut self, info: LockInfo) {
        let next = Self::state_for(&info);
        self.info = info;
        self.transition(next);
    }

    pub fn is_locked(&self) -> bool {
        self.state() != LockState::Unlocked
    }

    pub fn is_locked_by_current_user(&self) -> bool {
        self.state().is_held_by_me()
    }

    pub fn locked_by_name(&self) -> Option<&str> {
        if self.is_locked() {
            self.info.locked_by_name.as_deref()
        } else {
            None
        }
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        if self.is_locked() {
            self.info.locked_at
        } else {
            None
        }
    }

    /// Whether the current user may enter edit mode
    pub fn can_edit(&self) -> bool {
        !self.is_locked() || self.is_locked_by_current_user()
    }

    /// Edits are only accepted once the server confirmed the lock
    pub fn is_editing(&self) -> bool {
        self.state() == LockState::LockedByMe
    }
}
