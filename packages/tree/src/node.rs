//! # Position Nodes
//!
//! The building blocks of a quote outline. A position is either a
//! free-text block (which may group other positions) or a catalog article
//! (always a leaf).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Globally unique position identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(String);

impl PositionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PositionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PositionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PositionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    /// Free text; may contain nested positions
    Textblock,
    /// Priced catalog line item; never has children
    Article,
}

impl PositionKind {
    pub fn can_have_children(self) -> bool {
        matches!(self, PositionKind::Textblock)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionKind::Textblock => "textblock",
            PositionKind::Article => "article",
        }
    }
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable scalar fields of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionField {
    Title,
    Description,
}

impl PositionField {
    pub const ALL: [PositionField; 2] = [PositionField::Title, PositionField::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            PositionField::Title => "title",
            PositionField::Description => "description",
        }
    }
}

impl fmt::Display for PositionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the position tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionNode {
    pub id: PositionId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PositionNode>,
}

impl PositionNode {
    pub fn new(id: impl Into<PositionId>, title: impl Into<String>, kind: PositionKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            description: String::new(),
            children: Vec::new(),
        }
    }

    pub fn textblock(id: impl Into<PositionId>, title: impl Into<String>) -> Self {
        Self::new(id, title, PositionKind::Textblock)
    }

    pub fn article(id: impl Into<PositionId>, title: impl Into<String>) -> Self {
        Self::new(id, title, PositionKind::Article)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_children(mut self, children: Vec<PositionNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels in this subtree (1 for a leaf)
    pub fn height(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(PositionNode::height)
            .max()
            .unwrap_or(0)
    }

    /// Total nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(PositionNode::subtree_len)
            .sum::<usize>()
    }

    /// Depth-first search within this subtree (self included)
    pub fn find(&self, id: &str) -> Option<&PositionNode> {
        if self.id.as_str() == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn field(&self, field: PositionField) -> &str {
        match field {
            PositionField::Title => &self.title,
            PositionField::Description => &self.description,
        }
    }

    pub fn set_field(&mut self, field: PositionField, value: impl Into<String>) {
        match field {
            PositionField::Title => self.title = value.into(),
            PositionField::Description => self.description = value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_and_len() {
        let node = PositionNode::textblock("a", "A").with_children(vec![
            PositionNode::textblock("b", "B")
                .with_children(vec![PositionNode::article("c", "C")]),
            PositionNode::article("d", "D"),
        ]);

        assert_eq!(node.height(), 3);
        assert_eq!(node.subtree_len(), 4);
        assert!(node.find("c").is_some());
        assert!(node.find("zzz").is_none());
    }

    #[test]
    fn test_kind_children_rule() {
        assert!(PositionKind::Textblock.can_have_children());
        assert!(!PositionKind::Article.can_have_children());
    }

    #[test]
    fn test_node_wire_format() {
        let node = PositionNode::article("a-1", "Cable").with_description("5m");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "article");
        assert_eq!(json["id"], "a-1");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_field_access() {
        let mut node = PositionNode::textblock("t", "Intro");
        node.set_field(PositionField::Description, "Hello");

        assert_eq!(node.field(PositionField::Title), "Intro");
        assert_eq!(node.field(PositionField::Description), "Hello");
    }
}
