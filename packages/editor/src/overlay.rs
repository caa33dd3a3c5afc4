//! # Field Overlay
//!
//! Read-through resolution of field values: a pending value in the
//! [`ChangeTrackingStore`] wins over the canonical value in the tree.
//! Every renderer reads fields through here, so dirty state looks the same
//! everywhere.

use crate::changes::ChangeTrackingStore;
use quotetree_tree::{PositionField, PositionId, PositionKind, PositionNode, PositionTree};
use serde::Serialize;

/// What a renderer shows for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub field: PositionField,
    pub value: String,
    pub canonical: String,
    pub dirty: bool,
}

/// Details panel contents for the selected position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPanel {
    pub id: PositionId,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    pub fields: Vec<FieldView>,
}

/// Fields a position of `kind` exposes for editing
pub fn editable_fields(kind: PositionKind) -> &'static [PositionField] {
    match kind {
        PositionKind::Textblock => &PositionField::ALL,
        // Price and quantity live in the catalog; only the text is quote-local
        PositionKind::Article => &PositionField::ALL,
    }
}

#[derive(Clone, Copy)]
pub struct FieldOverlay<'a> {
    tree: &'a PositionTree,
    store: &'a ChangeTrackingStore,
}

impl<'a> FieldOverlay<'a> {
    pub fn new(tree: &'a PositionTree, store: &'a ChangeTrackingStore) -> Self {
        Self { tree, store }
    }

    /// Resolve a field of a node that is already at hand
    pub fn resolve_node(&self, node: &PositionNode, field: PositionField) -> FieldView {
        let canonical = node.field(field);
        let pending = self.store.pending_value(node.id.as_str(), field);

        FieldView {
            field,
            value: pending.unwrap_or(canonical).to_string(),
            canonical: canonical.to_string(),
            dirty: pending.is_some(),
        }
    }

    /// Resolve by id; `None` when the position is not in the tree
    pub fn resolve(&self, id: &str, field: PositionField) -> Option<FieldView> {
        self.tree
            .locate(id)
            .map(|node| self.resolve_node(node, field))
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.store.has_position_changes(id)
    }

    pub fn details(&self, id: &str) -> Option<DetailsPanel> {
        let node = self.tree.locate(id)?;
        Some(DetailsPanel {
            id: node.id.clone(),
            kind: node.kind,
            fields: editable_fields(node.kind)
                .iter()
                .map(|field| self.resolve_node(node, *field))
                .collect(),
        })
    }
}
