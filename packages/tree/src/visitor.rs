use crate::node::{PositionId, PositionNode};

/// Where a node sits while it is being visited
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    /// 1 for roots
    pub depth: usize,
    /// Enclosing node, `None` for roots
    pub parent: Option<&'a PositionId>,
    /// Zero-based index within the sibling group
    pub index: usize,
}

impl VisitContext<'_> {
    pub fn root(index: usize) -> Self {
        Self {
            depth: 1,
            parent: None,
            index,
        }
    }
}

/// Visitor pattern for traversing position trees immutably
///
/// The default implementation walks the whole tree depth-first, parents
/// before children. Override `visit_node` and call `walk_node` to keep
/// descending.
pub trait Visitor: Sized {
    fn visit_node<'a>(&mut self, node: &'a PositionNode, ctx: VisitContext<'a>) {
        walk_node(self, node, ctx);
    }
}

/// Mutable visitor for transforming nodes in place
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut PositionNode, depth: usize) {
        walk_node_mut(self, node, depth);
    }
}

pub fn walk_tree<V: Visitor>(visitor: &mut V, roots: &[PositionNode]) {
    for (index, node) in roots.iter().enumerate() {
        visitor.visit_node(node, VisitContext::root(index));
    }
}

pub fn walk_node<'a, V: Visitor>(visitor: &mut V, node: &'a PositionNode, ctx: VisitContext<'a>) {
    for (index, child) in node.children.iter().enumerate() {
        visitor.visit_node(
            child,
            VisitContext {
                depth: ctx.depth + 1,
                parent: Some(&node.id),
                index,
            },
        );
    }
}

pub fn walk_tree_mut<V: VisitorMut>(visitor: &mut V, roots: &mut [PositionNode]) {
    for node in roots.iter_mut() {
        visitor.visit_node_mut(node, 1);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut PositionNode, depth: usize) {
    for child in node.children.iter_mut() {
        visitor.visit_node_mut(child, depth + 1);
    }
}

/// Collects every id in depth-first order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<PositionId>,
}

impl Visitor for IdCollector {
    fn visit_node<'a>(&mut self, node: &'a PositionNode, ctx: VisitContext<'a>) {
        self.ids.push(node.id.clone());
        walk_node(self, node, ctx);
    }
}
