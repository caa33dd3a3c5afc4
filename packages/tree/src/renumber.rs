//! Absolute ordering assignments for persistence.

use crate::node::{PositionId, PositionNode};
use crate::tree::PositionTree;
use crate::visitor::{walk_node, walk_tree, VisitContext, Visitor};
use serde::{Deserialize, Serialize};

/// One position's place in the tree. Sent as a full replacement, never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub id: PositionId,
    pub position_number: u32,
    pub parent_id: Option<PositionId>,
}

#[derive(Default)]
struct Renumberer {
    updates: Vec<PositionUpdate>,
}

impl Visitor for Renumberer {
    fn visit_node<'a>(&mut self, node: &'a PositionNode, ctx: VisitContext<'a>) {
        self.updates.push(PositionUpdate {
            id: node.id.clone(),
            position_number: ctx.index as u32 + 1,
            parent_id: ctx.parent.cloned(),
        });
        walk_node(self, node, ctx);
    }
}

impl PositionTree {
    /// Number every sibling group 1..n, depth-first
    pub fn renumber(&self) -> Vec<PositionUpdate> {
        let mut renumberer = Renumberer::default();
        walk_tree(&mut renumberer, &self.roots);
        renumberer.updates
    }
}
