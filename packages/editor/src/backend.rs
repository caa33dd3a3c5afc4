//! # Persistence Backend
//!
//! The request/response shapes the editor core depends on. Transport and
//! storage live behind [`PositionsBackend`]; the core only ever sees these
//! DTOs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotetree_tree::{PositionId, PositionKind, PositionRecord, PositionUpdate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::changes::FieldChange;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The lock was lost, expired or never held
    #[error("Lock conflict: {0}")]
    LockConflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// What an advisory lock is keyed by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResource {
    pub resource_type: String,
    pub resource_id: String,
}

impl LockResource {
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// Server view of a lock, as seen by the requesting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    pub resource_type: String,
    pub resource_id: String,
    pub is_locked: bool,
    #[serde(default)]
    pub locked_by_user_id: Option<String>,
    #[serde(default)]
    pub locked_by_name: Option<String>,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_locked_by_current_user: bool,
}

impl LockInfo {
    pub fn unlocked(resource: &LockResource) -> Self {
        Self {
            resource_type: resource.resource_type.clone(),
            resource_id: resource.resource_id.clone(),
            is_locked: false,
            locked_by_user_id: None,
            locked_by_name: None,
            locked_at: None,
            is_locked_by_current_user: false,
        }
    }

    pub fn resource(&self) -> LockResource {
        LockResource::new(&self.resource_type, &self.resource_id)
    }
}

/// Request to create a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    #[serde(rename = "type")]
    pub kind: PositionKind,
    pub parent_id: Option<PositionId>,
    pub title: String,
}

/// Remote operations the editor core consumes
#[async_trait]
pub trait PositionsBackend: Send + Sync {
    /// Positions of a quote version, in display order, with parent references
    async fn fetch_positions(&self, version_id: &str) -> Result<Vec<PositionRecord>, BackendError>;

    /// Set the absolute order of positions. Idempotent.
    async fn reorder(&self, version_id: &str, updates: &[PositionUpdate]) -> Result<(), BackendError>;

    /// Persist field-level changes, returning the updated canonical records
    async fn save_changes(
        &self,
        version_id: &str,
        changes: &[FieldChange],
    ) -> Result<Vec<PositionRecord>, BackendError>;

    /// Create a position, returning its canonical record (with the new id)
    async fn add_position(
        &self,
        version_id: &str,
        position: &NewPosition,
    ) -> Result<PositionRecord, BackendError>;

    async fn lock_info(&self, resource: &LockResource) -> Result<LockInfo, BackendError>;

    async fn acquire_lock(&self, resource: &LockResource) -> Result<LockInfo, BackendError>;

    async fn release_lock(&self, resource: &LockResource) -> Result<LockInfo, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_info_wire_format() {
        let json = r#"{
            "resourceType": "quote_version",
            "resourceId": "v-1",
            "isLocked": true,
            "lockedByUserId": "u-2",
            "lockedByName": "Sam",
            "lockedAt": "2026-03-01T10:00:00Z",
            "isLockedByCurrentUser": false
        }"#;

        let info: LockInfo = serde_json::from_str(json).unwrap();
        assert!(info.is_locked);
        assert_eq!(info.locked_by_name.as_deref(), Some("Sam"));
        assert_eq!(info.resource(), LockResource::new("quote_version", "v-1"));
    }

    #[test]
    fn test_unlocked_info() {
        let info = LockInfo::unlocked(&LockResource::new("quote_version", "v-1"));
        assert!(!info.is_locked);
        assert!(info.locked_at.is_none());
    }
}
