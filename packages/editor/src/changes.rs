//! # Change Tracking
//!
//! Pending field edits, kept apart from the canonical tree until a save
//! succeeds. The store alone answers "are there unsaved edits".
//!
//! ## Semantics
//!
//! - Entries are keyed by `(position id, field)`
//! - An edit whose old and new values match drops the entry
//! - Recording a value equal to the original drops the entry
//! - The first recorded `old_value` is kept across repeated edits
//! - Nothing here touches the network

use quotetree_tree::{PositionField, PositionId, PositionTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Original and pending value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub old_value: String,
    pub new_value: String,
}

/// Flat save payload entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub position_id: PositionId,
    pub field: PositionField,
    pub old_value: String,
    pub new_value: String,
}

/// Per-position, per-field ledger of unsaved edits
#[derive(Debug, Clone, Default)]
pub struct ChangeTrackingStore {
    entries: BTreeMap<PositionId, BTreeMap<PositionField, ChangeRecord>>,
}

impl ChangeTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit. Equal values cancel any pending entry for the field.
    pub fn add_change(
        &mut self,
        position_id: &PositionId,
        field: PositionField,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) {
        let old_value = old_value.into();
        let new_value = new_value.into();
        if new_value == old_value {
            self.remove_change(position_id, Some(field));
            return;
        }

        let original = self
            .entries
            .get(position_id)
            .and_then(|fields| fields.get(&field))
            .map(|record| record.old_value.clone())
            .unwrap_or(old_value);

        if new_value == original {
            self.remove_change(position_id, Some(field));
            return;
        }

        self.entries.entry(position_id.clone()).or_default().insert(
            field,
            ChangeRecord {
                old_value: original,
                new_value,
            },
        );
    }

    /// Drop one field's entry, or every entry of the position when `field` is `None`
    pub fn remove_change(&mut self, position_id: &PositionId, field: Option<PositionField>) {
        match field {
            None => {
                self.entries.remove(position_id);
            }
            Some(field) => {
                if let Some(fields) = self.entries.get_mut(position_id) {
                    fields.remove(&field);
                    if fields.is_empty() {
                        self.entries.remove(position_id);
                    }
                }
            }
        }
    }

    pub fn has_position_changes(&self, position_id: &str) -> bool {
        self.entries
            .get(position_id)
            .map_or(false, |fields| !fields.is_empty())
    }

    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of pending field entries
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_position_changes(&self, position_id: &str) -> BTreeMap<PositionField, ChangeRecord> {
        self.entries.get(position_id).cloned().unwrap_or_default()
    }

    /// Pending value of a single field
    pub fn pending_value(&self, position_id: &str, field: PositionField) -> Option<&str> {
        self.entries
            .get(position_id)
            .and_then(|fields| fields.get(&field))
            .map(|record| record.new_value.as_str())
    }

    /// Every pending entry, ordered by position id then field
    pub fn get_changes_for_save(&self) -> Vec<FieldChange> {
        self.entries
            .iter()
            .flat_map(|(position_id, fields)| {
                fields.iter().map(move |(field, record)| FieldChange {
                    position_id: position_id.clone(),
                    field: *field,
                    old_value: record.old_value.clone(),
                    new_value: record.new_value.clone(),
                })
            })
            .collect()
    }

    pub fn clear_all_changes(&mut self) {
        self.entries.clear();
    }

    /// Drop entries whose position no longer exists; returns how many positions were dropped
    pub fn forget_missing(&mut self, tree: &PositionTree) -> usize {
        let before = self.entries.len();
        self.entries.retain(|position_id, _| tree.contains(position_id.as_str()));
        before - self.entries.len()
    }
}
