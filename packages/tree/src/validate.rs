use crate::error::{TreeError, ValidationError};
use crate::node::{PositionId, PositionNode};
use crate::tree::TreeLimits;
use crate::visitor::{walk_node, walk_tree, VisitContext, Visitor};
use std::collections::HashSet;

/// Checks structural invariants, stopping at the first violation
struct InvariantChecker {
    limits: TreeLimits,
    seen: HashSet<PositionId>,
    error: Option<TreeError>,
}

impl InvariantChecker {
    fn check(&mut self, node: &PositionNode, ctx: VisitContext<'_>) -> Result<(), TreeError> {
        if !self.seen.insert(node.id.clone()) {
            return Err(TreeError::DuplicateId(node.id.clone()));
        }
        if !node.kind.can_have_children() && !node.children.is_empty() {
            return Err(ValidationError::ArticleCannotHaveChildren(node.id.clone()).into());
        }
        self.limits.check_depth(ctx.depth, 1)?;
        Ok(())
    }
}

impl Visitor for InvariantChecker {
    fn visit_node<'a>(&mut self, node: &'a PositionNode, ctx: VisitContext<'a>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.check(node, ctx) {
            self.error = Some(error);
            return;
        }
        walk_node(self, node, ctx);
    }
}

/// Validate ids, kinds and depth for a forest
pub fn validate_roots(roots: &[PositionNode], limits: TreeLimits) -> Result<(), TreeError> {
    let mut checker = InvariantChecker {
        limits,
        seen: HashSet::new(),
        error: None,
    };
    walk_tree(&mut checker, roots);
    match checker.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
