//! # Position Tree
//!
//! An ordered forest of positions. The tree owns its nodes; every
//! structural mutation goes through validation first and either applies
//! fully or not at all.
//!
//! ## Invariants
//!
//! 1. Articles never have children
//! 2. Depth never exceeds `TreeLimits::max_depth` (roots are depth 1)
//! 3. Ids are unique across the whole forest

use crate::error::{TreeError, ValidationError};
use crate::node::{PositionId, PositionNode};
use crate::validate::validate_roots;
use crate::visitor::{walk_tree, IdCollector};
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth for quote outlines
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Structural limits enforced on every mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLimits {
    pub max_depth: usize,
}

impl TreeLimits {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check that a subtree of `height` levels rooted at `depth` fits
    pub fn check_depth(&self, depth: usize, height: usize) -> Result<(), ValidationError> {
        let deepest = depth + height.saturating_sub(1);
        if deepest > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                depth: deepest,
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Hierarchical position structure for one quote version
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionTree {
    pub(crate) roots: Vec<PositionNode>,
    pub(crate) limits: TreeLimits,
}

impl PositionTree {
    pub fn empty(limits: TreeLimits) -> Self {
        Self {
            roots: Vec::new(),
            limits,
        }
    }

    /// Build a tree from already nested nodes with default limits
    pub fn new(roots: Vec<PositionNode>) -> Result<Self, TreeError> {
        Self::with_limits(roots, TreeLimits::default())
    }

    pub fn with_limits(roots: Vec<PositionNode>, limits: TreeLimits) -> Result<Self, TreeError> {
        validate_roots(&roots, limits)?;
        Ok(Self { roots, limits })
    }

    pub fn roots(&self) -> &[PositionNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<PositionNode> {
        self.roots
    }

    pub fn limits(&self) -> TreeLimits {
        self.limits
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of positions
    pub fn len(&self) -> usize {
        self.roots.iter().map(PositionNode::subtree_len).sum()
    }

    /// All ids, depth-first
    pub fn ids(&self) -> Vec<PositionId> {
        let mut collector = IdCollector::default();
        walk_tree(&mut collector, &self.roots);
        collector.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Depth-first search for a node
    pub fn locate(&self, id: &str) -> Option<&PositionNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn locate_mut(&mut self, id: &str) -> Option<&mut PositionNode> {
        find_mut(&mut self.roots, id)
    }

    /// Nesting level of a node, 1 for roots
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        fn search(nodes: &[PositionNode], id: &str, depth: usize) -> Option<usize> {
            nodes.iter().find_map(|node| {
                if node.id.as_str() == id {
                    Some(depth)
                } else {
                    search(&node.children, id, depth + 1)
                }
            })
        }
        search(&self.roots, id, 1)
    }

    /// Parent id of a node. `Some(None)` for roots, `None` when the id is unknown.
    pub fn parent_of(&self, id: &str) -> Option<Option<&PositionId>> {
        fn search<'a>(
            nodes: &'a [PositionNode],
            parent: Option<&'a PositionId>,
            id: &str,
        ) -> Option<Option<&'a PositionId>> {
            nodes.iter().find_map(|node| {
                if node.id.as_str() == id {
                    Some(parent)
                } else {
                    search(&node.children, Some(&node.id), id)
                }
            })
        }
        search(&self.roots, None, id)
    }

    /// Sibling group a node would join: the parent's children or the roots
    pub(crate) fn siblings_mut<'r>(
        roots: &'r mut Vec<PositionNode>,
        parent: Option<&PositionId>,
    ) -> Result<&'r mut Vec<PositionNode>, TreeError> {
        match parent {
            None => Ok(roots),
            Some(parent_id) => find_mut(roots, parent_id.as_str())
                .map(|node| &mut node.children)
                .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone())),
        }
    }

    /// Check that `parent` can accept a subtree of `height` levels
    pub fn check_target(
        &self,
        parent: Option<&PositionId>,
        height: usize,
    ) -> Result<(), TreeError> {
        let depth = match parent {
            None => 1,
            Some(parent_id) => {
                let node = self
                    .locate(parent_id.as_str())
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                if !node.kind.can_have_children() {
                    return Err(ValidationError::ArticleCannotHaveChildren(parent_id.clone()).into());
                }
                // Located above, so the depth exists
                self.depth_of(parent_id.as_str()).unwrap_or(0) + 1
            }
        };
        self.limits.check_depth(depth, height)?;
        Ok(())
    }

    /// Insert a new subtree under `parent` at `index` (appends when `None`)
    pub fn insert(
        &mut self,
        node: PositionNode,
        parent: Option<&PositionId>,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        validate_roots(std::slice::from_ref(&node), TreeLimits::new(usize::MAX))?;

        let mut incoming = IdCollector::default();
        walk_tree(&mut incoming, std::slice::from_ref(&node));
        if let Some(duplicate) = incoming.ids.into_iter().find(|id| self.contains(id.as_str())) {
            return Err(TreeError::DuplicateId(duplicate));
        }

        self.check_target(parent, node.height())?;

        let siblings = Self::siblings_mut(&mut self.roots, parent)?;
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, node);
        Ok(())
    }

    /// Re-check every invariant
    pub fn validate(&self) -> Result<(), TreeError> {
        validate_roots(&self.roots, self.limits)
    }
}

pub(crate) fn find_mut<'a>(nodes: &'a mut [PositionNode], id: &str) -> Option<&'a mut PositionNode> {
    for node in nodes.iter_mut() {
        if node.id.as_str() == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}
