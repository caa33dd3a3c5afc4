//! # In-Memory Backend
//!
//! A shared fake server plus per-user clients implementing
//! [`PositionsBackend`]. Used by tests, the CLI and demos.
//!
//! - Locks are held per resource by one user at a time
//! - Saving requires holding a lock on the version
//! - Any operation can be made to fail until healed
//! - Every call is counted, including failing ones

use crate::backend::{BackendError, LockInfo, LockResource, NewPosition, PositionsBackend};
use crate::changes::FieldChange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotetree_tree::{PositionField, PositionId, PositionRecord, PositionUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUser {
    pub id: String,
    pub name: String,
}

impl BackendUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchPositions,
    Reorder,
    SaveChanges,
    AddPosition,
    LockInfo,
    AcquireLock,
    ReleaseLock,
}

#[derive(Debug, Clone)]
struct HeldLock {
    user: BackendUser,
    locked_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ServerState {
    versions: HashMap<String, Vec<PositionRecord>>,
    locks: HashMap<LockResource, HeldLock>,
    failures: HashMap<Operation, BackendError>,
    calls: HashMap<Operation, usize>,
    next_id: u64,
}

impl ServerState {
    fn version_mut(&mut self, version_id: &str) -> Result<&mut Vec<PositionRecord>, BackendError> {
        self.versions
            .get_mut(version_id)
            .ok_or_else(|| BackendError::NotFound(format!("version {version_id}")))
    }

    fn lock_info(&self, resource: &LockResource, user: &BackendUser) -> LockInfo {
        match self.locks.get(resource) {
            None => LockInfo::unlocked(resource),
            Some(held) => LockInfo {
                resource_type: resource.resource_type.clone(),
                resource_id: resource.resource_id.clone(),
                is_locked: true,
                locked_by_user_id: Some(held.user.id.clone()),
                locked_by_name: Some(held.user.name.clone()),
                locked_at: Some(held.locked_at),
                is_locked_by_current_user: held.user.id == user.id,
            },
        }
    }

    fn holds_version(&self, version_id: &str, user: &BackendUser) -> bool {
        self.locks
            .iter()
            .any(|(resource, held)| resource.resource_id == version_id && held.user.id == user.id)
    }
}

/// Shared state every [`InMemoryBackend`] client talks to
#[derive(Debug, Clone, Default)]
pub struct InMemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_version(&self, version_id: impl Into<String>, records: Vec<PositionRecord>) {
        self.state().versions.insert(version_id.into(), records);
    }

    /// Canonical records of a version, as stored
    pub fn positions(&self, version_id: &str) -> Vec<PositionRecord> {
        self.state()
            .versions
            .get(version_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn client(&self, user: BackendUser) -> InMemoryBackend {
        InMemoryBackend {
            server: self.clone(),
            user,
        }
    }

    /// Make every call of `operation` fail with `error` until healed
    pub fn fail(&self, operation: Operation, error: BackendError) {
        self.state().failures.insert(operation, error);
    }

    pub fn heal(&self, operation: Operation) {
        self.state().failures.remove(&operation);
    }

    pub fn calls(&self, operation: Operation) -> usize {
        self.state().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Drop a lock as if it had expired server-side
    pub fn expire_lock(&self, resource: &LockResource) {
        self.state().locks.remove(resource);
    }

    /// Id of the user currently holding `resource`
    pub fn holder(&self, resource: &LockResource) -> Option<String> {
        self.state()
            .locks
            .get(resource)
            .map(|held| held.user.id.clone())
    }

    /// Count the call and return the injected failure, if any
    fn enter(&self, operation: Operation) -> Result<MutexGuard<'_, ServerState>, BackendError> {
        let mut state = self.state();
        *state.calls.entry(operation).or_default() += 1;
        if let Some(error) = state.failures.get(&operation).cloned() {
            return Err(error);
        }
        Ok(state)
    }
}

/// One user's connection to an [`InMemoryServer`]
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    server: InMemoryServer,
    user: BackendUser,
}

impl InMemoryBackend {
    pub fn user(&self) -> &BackendUser {
        &self.user
    }

    pub fn server(&self) -> &InMemoryServer {
        &self.server
    }
}

#[async_trait]
impl PositionsBackend for InMemoryBackend {
    async fn fetch_positions(&self, version_id: &str) -> Result<Vec<PositionRecord>, BackendError> {
        let mut state = self.server.enter(Operation::FetchPositions)?;
        Ok(state.version_mut(version_id)?.clone())
    }

    async fn reorder(&self, version_id: &str, updates: &[PositionUpdate]) -> Result<(), BackendError> {
        let mut state = self.server.enter(Operation::Reorder)?;
        let records = state.version_mut(version_id)?;

        if let Some(unknown) = updates
            .iter()
            .find(|update| !records.iter().any(|record| record.id == update.id))
        {
            return Err(BackendError::NotFound(format!("position {}", unknown.id)));
        }

        for update in updates {
            if let Some(record) = records.iter_mut().find(|record| record.id == update.id) {
                record.parent_id = update.parent_id.clone();
                record.position_number = Some(update.position_number);
            }
        }
        debug!(version_id, updates = updates.len(), "Applied reorder");
        Ok(())
    }

    async fn save_changes(
        &self,
        version_id: &str,
        changes: &[FieldChange],
    ) -> Result<Vec<PositionRecord>, BackendError> {
        let mut state = self.server.enter(Operation::SaveChanges)?;
        if !state.holds_version(version_id, &self.user) {
            return Err(BackendError::LockConflict(format!(
                "{} does not hold the lock on {version_id}",
                self.user.name
            )));
        }

        let records = state.version_mut(version_id)?;
        if let Some(unknown) = changes
            .iter()
            .find(|change| !records.iter().any(|record| record.id == change.position_id))
        {
            return Err(BackendError::NotFound(format!(
                "position {}",
                unknown.position_id
            )));
        }

        for change in changes {
            if let Some(record) = records
                .iter_mut()
                .find(|record| record.id == change.position_id)
            {
                match change.field {
                    PositionField::Title => record.title = change.new_value.clone(),
                    PositionField::Description => record.description = change.new_value.clone(),
                }
            }
        }
        Ok(records.clone())
    }

    async fn add_position(
        &self,
        version_id: &str,
        position: &NewPosition,
    ) -> Result<PositionRecord, BackendError> {
        let mut state = self.server.enter(Operation::AddPosition)?;
        state.next_id += 1;
        let id = PositionId::new(format!("pos-{}", state.next_id));

        let records = state.version_mut(version_id)?;
        if let Some(parent) = &position.parent_id {
            if !records.iter().any(|record| &record.id == parent) {
                return Err(BackendError::NotFound(format!("position {parent}")));
            }
        }

        let siblings = records
            .iter()
            .filter(|record| record.parent_id == position.parent_id)
            .count();
        let record = PositionRecord {
            id,
            parent_id: position.parent_id.clone(),
            title: position.title.clone(),
            kind: position.kind,
            description: String::new(),
            position_number: Some(siblings as u32 + 1),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn lock_info(&self, resource: &LockResource) -> Result<LockInfo, BackendError> {
        let state = self.server.enter(Operation::LockInfo)?;
        Ok(state.lock_info(resource, &self.user))
    }

    async fn acquire_lock(&self, resource: &LockResource) -> Result<LockInfo, BackendError> {
        let mut state = self.server.enter(Operation::AcquireLock)?;
        let held_by_other = state
            .locks
            .get(resource)
            .map_or(false, |held| held.user.id != self.user.id);

        if !held_by_other {
            state.locks.insert(
                resource.clone(),
                HeldLock {
                    user: self.user.clone(),
                    locked_at: Utc::now(),
                },
            );
        }
        Ok(state.lock_info(resource, &self.user))
    }

    async fn release_lock(&self, resource: &LockResource) -> Result<LockInfo, BackendError> {
        let mut state = self.server.enter(Operation::ReleaseLock)?;
        if let Some(held) = state.locks.get(resource) {
            if held.user.id != self.user.id {
                return Err(BackendError::LockConflict(format!(
                    "locked by {}",
                    held.user.name
                )));
            }
        }
        state.locks.remove(resource);
        Ok(state.lock_info(resource, &self.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotetree_tree::PositionKind;

    fn record(id: &str, parent: Option<&str>) -> PositionRecord {
        PositionRecord {
            id: id.into(),
            parent_id: parent.map(PositionId::from),
            title: id.to_uppercase(),
            kind: PositionKind::Textblock,
            description: String::new(),
            position_number: None,
        }
    }

    fn setup() -> (InMemoryServer, InMemoryBackend, InMemoryBackend) {
        let server = InMemoryServer::new();
        server.insert_version("v1", vec![record("a", None), record("b", None)]);
        let alice = server.client(BackendUser::new("u1", "Alice"));
        let bob = server.client(BackendUser::new("u2", "Bob"));
        (server, alice, bob)
    }

    fn resource() -> LockResource {
        LockResource::new("quote_version", "v1")
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let (server, alice, bob) = setup();

        let info = alice.acquire_lock(&resource()).await.unwrap();
        assert!(info.is_locked_by_current_user);

        let info = bob.acquire_lock(&resource()).await.unwrap();
        assert!(info.is_locked);
        assert!(!info.is_locked_by_current_user);
        assert_eq!(info.locked_by_name.as_deref(), Some("Alice"));
        assert_eq!(server.holder(&resource()).as_deref(), Some("u1"));

        assert!(matches!(
            bob.release_lock(&resource()).await,
            Err(BackendError::LockConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_save_requires_lock() {
        let (server, alice, _) = setup();
        let change = FieldChange {
            position_id: "a".into(),
            field: PositionField::Title,
            old_value: "A".into(),
            new_value: "Alpha".into(),
        };

        assert!(matches!(
            alice.save_changes("v1", &[change.clone()]).await,
            Err(BackendError::LockConflict(_))
        ));

        alice.acquire_lock(&resource()).await.unwrap();
        let records = alice.save_changes("v1", &[change]).await.unwrap();
        assert_eq!(records[0].title, "Alpha");
        assert_eq!(server.positions("v1")[0].title, "Alpha");
    }

    #[tokio::test]
    async fn test_reorder_updates_numbers() {
        let (server, alice, _) = setup();
        let updates = vec![
            PositionUpdate {
                id: "b".into(),
                position_number: 1,
                parent_id: None,
            },
            PositionUpdate {
                id: "a".into(),
                position_number: 2,
                parent_id: None,
            },
        ];

        alice.reorder("v1", &updates).await.unwrap();
        let positions = server.positions("v1");
        assert_eq!(positions[1].position_number, Some(1));
        assert_eq!(positions[0].position_number, Some(2));
    }

    #[tokio::test]
    async fn test_failure_injection_counts_calls() {
        let (server, alice, _) = setup();
        server.fail(Operation::FetchPositions, BackendError::Transport("offline".into()));

        assert!(alice.fetch_positions("v1").await.is_err());
        server.heal(Operation::FetchPositions);
        assert_eq!(alice.fetch_positions("v1").await.unwrap().len(), 2);

        assert_eq!(server.calls(Operation::FetchPositions), 2);
        assert_eq!(server.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_add_position_appends() {
        let (server, alice, _) = setup();
        let created = alice
            .add_position(
                "v1",
                &NewPosition {
                    kind: PositionKind::Article,
                    parent_id: Some("a".into()),
                    title: "Cable".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.position_number, Some(1));
        assert_eq!(created.parent_id, Some(PositionId::from("a")));
        assert_eq!(server.positions("v1").len(), 3);
    }

    #[tokio::test]
    async fn test_expire_lock() {
        let (server, alice, _) = setup();
        alice.acquire_lock(&resource()).await.unwrap();
        server.expire_lock(&resource());

        let info = alice.lock_info(&resource()).await.unwrap();
        assert!(!info.is_locked);
    }
}
