//! Flattened rows for the tree widget.

use crate::overlay::FieldOverlay;
use quotetree_tree::visitor::{walk_node, walk_tree, VisitContext, Visitor};
use quotetree_tree::{PositionField, PositionId, PositionKind, PositionNode, PositionTree};
use serde::Serialize;

/// One rendered tree entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub id: PositionId,
    /// Title as the user currently sees it
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    pub depth: usize,
    pub parent_id: Option<PositionId>,
    pub children: Vec<PositionId>,
    pub selected: bool,
    pub dirty: bool,
}

struct RowBuilder<'a> {
    overlay: FieldOverlay<'a>,
    selection: Option<&'a PositionId>,
    rows: Vec<TreeRow>,
}

impl Visitor for RowBuilder<'_> {
    fn visit_node<'n>(&mut self, node: &'n PositionNode, ctx: VisitContext<'n>) {
        self.rows.push(TreeRow {
            id: node.id.clone(),
            name: self.overlay.resolve_node(node, PositionField::Title).value,
            kind: node.kind,
            depth: ctx.depth,
            parent_id: ctx.parent.cloned(),
            children: node.children.iter().map(|child| child.id.clone()).collect(),
            selected: self.selection.map_or(false, |id| *id == node.id),
            dirty: self.overlay.is_dirty(node.id.as_str()),
        });
        walk_node(self, node, ctx);
    }
}

/// Rows in display order (pre-order)
pub fn tree_rows(
    tree: &PositionTree,
    overlay: FieldOverlay<'_>,
    selection: Option<&PositionId>,
) -> Vec<TreeRow> {
    let mut builder = RowBuilder {
        overlay,
        selection,
        rows: Vec::with_capacity(tree.len()),
    };
    walk_tree(&mut builder, tree.roots());
    builder.rows
}
