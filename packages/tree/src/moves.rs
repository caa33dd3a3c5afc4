//! # Position Moves
//!
//! Drag/drop relocation of one or more positions.
//!
//! ## Semantics
//!
//! - Validated up front: a rejected move leaves the tree untouched
//! - Fails if the target parent is an article
//! - Fails if any moved node would end up deeper than the depth limit
//! - Fails if the target is a dragged node or inside one (cycle)
//! - Dragged ids that no longer exist are filtered out silently
//! - Dragged nodes nested inside another dragged node travel with it
//! - Moved subtrees keep their original depth-first relative order
//! - The target index refers to the sibling group after detaching and is
//!   clamped to its length

use crate::error::{TreeError, ValidationError};
use crate::node::{PositionId, PositionNode};
use crate::tree::PositionTree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A drag/drop relocation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub drag_ids: Vec<PositionId>,
    #[serde(default)]
    pub target_parent_id: Option<PositionId>,
    #[serde(default)]
    pub target_index: usize,
}

impl MoveRequest {
    pub fn new(
        drag_ids: impl IntoIterator<Item = impl Into<PositionId>>,
        target_parent_id: Option<impl Into<PositionId>>,
        target_index: usize,
    ) -> Self {
        Self {
            drag_ids: drag_ids.into_iter().map(Into::into).collect(),
            target_parent_id: target_parent_id.map(Into::into),
            target_index,
        }
    }
}

/// Result of a successful move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// The relocated tree
    pub tree: PositionTree,

    /// Roots of the subtrees that were relocated, in insertion order
    pub moved: Vec<PositionId>,

    /// Requested ids that were not present in the tree
    pub missing: Vec<PositionId>,
}

impl MoveOutcome {
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

impl PositionTree {
    /// Validate without applying
    pub fn validate_move(&self, request: &MoveRequest) -> Result<(), TreeError> {
        let drag_set = drag_set(request);
        let target = request.target_parent_id.as_ref();

        if let Some(target_id) = target {
            let parent = self
                .locate(target_id.as_str())
                .ok_or_else(|| TreeError::ParentNotFound(target_id.clone()))?;
            if !parent.kind.can_have_children() {
                return Err(ValidationError::ArticleCannotHaveChildren(target_id.clone()).into());
            }
        }

        let dragged = top_level_dragged(&self.roots, &drag_set);

        if let Some(target_id) = target {
            if dragged.iter().any(|node| node.find(target_id.as_str()).is_some()) {
                return Err(ValidationError::CycleDetected.into());
            }
        }

        for node in dragged {
            self.check_target(target, node.height())?;
        }

        Ok(())
    }

    /// Move the dragged positions under `target_parent_id` at `target_index`.
    ///
    /// Returns a new tree; `self` is never modified.
    pub fn move_positions(&self, request: &MoveRequest) -> Result<MoveOutcome, TreeError> {
        self.validate_move(request)?;

        let missing: Vec<PositionId> = request
            .drag_ids
            .iter()
            .filter(|id| !self.contains(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(?missing, "ignoring unknown drag ids");
        }

        // Work on a copy so readers of `self` never observe a half-applied move
        let mut roots = self.roots.clone();
        let mut detached = Vec::new();
        detach(&mut roots, &drag_set(request), &mut detached);

        let moved: Vec<PositionId> = detached.iter().map(|node| node.id.clone()).collect();
        if !detached.is_empty() {
            let siblings = Self::siblings_mut(&mut roots, request.target_parent_id.as_ref())?;
            let index = request.target_index.min(siblings.len());
            siblings.splice(index..index, detached);
        }

        tracing::debug!(
            moved = moved.len(),
            target = ?request.target_parent_id,
            index = request.target_index,
            "moved positions"
        );

        Ok(MoveOutcome {
            tree: PositionTree {
                roots,
                limits: self.limits,
            },
            moved,
            missing,
        })
    }
}

fn drag_set(request: &MoveRequest) -> HashSet<&str> {
    request.drag_ids.iter().map(PositionId::as_str).collect()
}

/// Dragged nodes that are not nested inside another dragged node
fn top_level_dragged<'a>(nodes: &'a [PositionNode], drag: &HashSet<&str>) -> Vec<&'a PositionNode> {
    let mut out = Vec::new();
    for node in nodes {
        if drag.contains(node.id.as_str()) {
            out.push(node);
        } else {
            out.extend(top_level_dragged(&node.children, drag));
        }
    }
    out
}

/// Remove dragged nodes from wherever they sit, collecting them in order
fn detach(nodes: &mut Vec<PositionNode>, drag: &HashSet<&str>, out: &mut Vec<PositionNode>) {
    let mut kept = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        if drag.contains(node.id.as_str()) {
            out.push(node);
        } else {
            detach(&mut node.children, drag, out);
            kept.push(node);
        }
    }
    *nodes = kept;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nodes: &[PositionNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn tree() -> PositionTree {
        PositionTree::new(vec![
            PositionNode::textblock("a", "A").with_children(vec![
                PositionNode::article("a1", "A1"),
                PositionNode::textblock("a2", "A2")
                    .with_children(vec![PositionNode::article("a2x", "A2x")]),
            ]),
            PositionNode::textblock("b", "B"),
            PositionNode::article("c", "C"),
        ])
        .unwrap()
    }

    #[test]
    fn test_move_into_parent_at_index() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["c"], Some("a"), 1))
            .unwrap();

        assert_eq!(ids(outcome.tree.roots()), vec!["a", "b"]);
        assert_eq!(ids(&outcome.tree.roots()[0].children), vec!["a1", "c", "a2"]);
        assert_eq!(outcome.moved, vec![PositionId::from("c")]);
    }

    #[test]
    fn test_input_tree_untouched() {
        let original = tree();
        let _ = original
            .move_positions(&MoveRequest::new(["a1"], None::<&str>, 0))
            .unwrap();

        assert_eq!(original, tree());
    }

    #[test]
    fn test_index_clamped() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["a1"], None::<&str>, 99))
            .unwrap();

        assert_eq!(ids(outcome.tree.roots()), vec!["a", "b", "c", "a1"]);
    }

    #[test]
    fn test_multiple_drag_keeps_tree_order() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["c", "a1"], Some("b"), 0))
            .unwrap();

        assert_eq!(ids(&outcome.tree.roots()[1].children), vec!["a1", "c"]);
    }

    #[test]
    fn test_nested_drag_travels_with_ancestor() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["a2", "a2x"], Some("b"), 0))
            .unwrap();

        let b = outcome.tree.locate("b").unwrap();
        assert_eq!(ids(&b.children), vec!["a2"]);
        assert_eq!(ids(&b.children[0].children), vec!["a2x"]);
        assert_eq!(outcome.tree.len(), tree().len());
    }

    #[test]
    fn test_missing_ids_filtered() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["ghost", "c"], Some("b"), 0))
            .unwrap();

        assert_eq!(outcome.missing, vec![PositionId::from("ghost")]);
        assert_eq!(outcome.moved, vec![PositionId::from("c")]);
    }

    #[test]
    fn test_all_missing_is_noop() {
        let outcome = tree()
            .move_positions(&MoveRequest::new(["ghost"], None::<&str>, 0))
            .unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.tree, tree());
    }

    #[test]
    fn test_article_target_rejected() {
        let original = tree();
        let result = original.move_positions(&MoveRequest::new(["b"], Some("a1"), 0));

        assert_eq!(
            result,
            Err(TreeError::Validation(ValidationError::ArticleCannotHaveChildren(
                "a1".into()
            )))
        );
        assert_eq!(original, tree());
    }

    #[test]
    fn test_cycle_rejected() {
        let result = tree().move_positions(&MoveRequest::new(["a"], Some("a2"), 0));
        assert_eq!(result, Err(TreeError::Validation(ValidationError::CycleDetected)));

        let result = tree().move_positions(&MoveRequest::new(["b"], Some("b"), 0));
        assert_eq!(result, Err(TreeError::Validation(ValidationError::CycleDetected)));
    }

    #[test]
    fn test_unknown_target_rejected() {
        let result = tree().move_positions(&MoveRequest::new(["c"], Some("ghost"), 0));
        assert_eq!(result, Err(TreeError::ParentNotFound("ghost".into())));
    }

    #[test]
    fn test_subtree_depth_counts() {
        // s has a child, so landing under t3 (depth 3) puts s1 at depth 5
        let base = PositionTree::new(vec![
            PositionNode::textblock("t1", "T1").with_children(vec![PositionNode::textblock(
                "t2", "T2",
            )
            .with_children(vec![PositionNode::textblock("t3", "T3")])]),
            PositionNode::textblock("s", "S")
                .with_children(vec![PositionNode::article("s1", "S1")]),
        ])
        .unwrap();

        let result = base.move_positions(&MoveRequest::new(["s"], Some("t3"), 0));
        assert_eq!(
            result,
            Err(TreeError::Validation(ValidationError::DepthExceeded { depth: 5, max: 4 }))
        );

        let ok = base.move_positions(&MoveRequest::new(["s1"], Some("t3"), 0));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"dragIds": ["a"], "targetParentId": null, "targetIndex": 2}"#;
        let request: MoveRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request, MoveRequest::new(["a"], None::<&str>, 2));
    }
}
