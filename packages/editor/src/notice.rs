//! User-facing notifications emitted by the session.

use crate::commands::MoveCommand;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    LockAcquired,
    LockDenied { locked_by: Option<String> },
    LockAcquireFailed { reason: String },
    LockReleaseFailed { reason: String },
    /// Our lock expired or was taken; edits were kept
    LockLost,
    NothingToSave,
    Saved { changes: usize },
    SaveFailed { reason: String },
    /// Background reorder failed; carries the command so the host can retry
    ReorderFailed { command: MoveCommand, reason: String },
    /// A structural change was refused locally
    Rejected { reason: String },
    Reloaded,
    ReloadFailed { reason: String },
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::LockAcquired | Notice::Saved { .. } => NoticeLevel::Success,
            Notice::NothingToSave | Notice::Reloaded => NoticeLevel::Info,
            Notice::LockDenied { .. } | Notice::LockLost | Notice::Rejected { .. } => {
                NoticeLevel::Warning
            }
            Notice::LockAcquireFailed { .. }
            | Notice::LockReleaseFailed { .. }
            | Notice::SaveFailed { .. }
            | Notice::ReorderFailed { .. }
            | Notice::ReloadFailed { .. } => NoticeLevel::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::LockAcquired => "Edit mode enabled".to_string(),
            Notice::LockDenied { locked_by } => format!(
                "Currently being edited by {}",
                locked_by.as_deref().unwrap_or("another user")
            ),
            Notice::LockAcquireFailed { reason } => format!("Could not enter edit mode: {reason}"),
            Notice::LockReleaseFailed { reason } => format!("Could not release edit lock: {reason}"),
            Notice::LockLost => {
                "Your edit lock has expired. Your changes were kept; enter edit mode again to save."
                    .to_string()
            }
            Notice::NothingToSave => "Nothing to save".to_string(),
            Notice::Saved { changes } => format!("Saved {changes} change(s)"),
            Notice::SaveFailed { reason } => format!("Save failed: {reason}"),
            Notice::ReorderFailed { reason, .. } => format!("Could not save new order: {reason}"),
            Notice::Rejected { reason } => reason.clone(),
            Notice::Reloaded => "Positions reloaded".to_string(),
            Notice::ReloadFailed { reason } => format!("Could not reload positions: {reason}"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
