//! # Flat Position Records
//!
//! Persistence hands positions out as a flat list with parent references.
//! This module assembles that list into a [`PositionTree`].

use crate::error::TreeError;
use crate::node::{PositionId, PositionKind, PositionNode};
use crate::tree::{PositionTree, TreeLimits};
use crate::validate::validate_roots;
use crate::visitor::{walk_node_mut, walk_tree_mut, VisitorMut};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One fetched position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub id: PositionId,
    #[serde(default)]
    pub parent_id: Option<PositionId>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_number: Option<u32>,
}

impl PositionRecord {
    fn into_node(self, children: Vec<PositionNode>) -> PositionNode {
        PositionNode {
            id: self.id,
            title: self.title,
            kind: self.kind,
            description: self.description,
            children,
        }
    }
}

impl PositionTree {
    /// Assemble a tree from records using default limits
    pub fn from_records(records: Vec<PositionRecord>) -> Result<Self, TreeError> {
        Self::from_records_with_limits(records, TreeLimits::default())
    }

    /// Roots are records without a parent; children attach by parent id.
    ///
    /// Sibling order follows `position_number` when present, fetch order
    /// otherwise.
    pub fn from_records_with_limits(
        records: Vec<PositionRecord>,
        limits: TreeLimits,
    ) -> Result<Self, TreeError> {
        let mut known = HashSet::with_capacity(records.len());
        for record in &records {
            if !known.insert(record.id.clone()) {
                return Err(TreeError::DuplicateId(record.id.clone()));
            }
        }

        let mut groups: HashMap<Option<PositionId>, Vec<PositionRecord>> = HashMap::new();
        for record in records {
            if let Some(parent) = &record.parent_id {
                if !known.contains(parent) {
                    return Err(TreeError::OrphanPosition {
                        id: record.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            groups.entry(record.parent_id.clone()).or_default().push(record);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|record| record.position_number);
        }

        let roots = assemble(None, &mut groups);

        if !groups.is_empty() {
            let mut ids: Vec<PositionId> = groups
                .into_values()
                .flatten()
                .map(|record| record.id)
                .collect();
            ids.sort();
            return Err(TreeError::Unreachable { ids });
        }

        validate_roots(&roots, limits)?;
        tracing::debug!(roots = roots.len(), "assembled position tree");
        Ok(Self { roots, limits })
    }

    /// Overwrite title and description of every node with a matching record.
    ///
    /// Structure is left alone; returns how many nodes were updated.
    pub fn merge_records(&mut self, records: &[PositionRecord]) -> usize {
        let mut merger = RecordMerger {
            records: records
                .iter()
                .map(|record| (record.id.as_str(), record))
                .collect(),
            merged: 0,
        };
        walk_tree_mut(&mut merger, &mut self.roots);
        merger.merged
    }

    /// Flatten back into records, numbering each sibling group from 1
    pub fn to_records(&self) -> Vec<PositionRecord> {
        fn flatten(
            nodes: &[PositionNode],
            parent: Option<&PositionId>,
            out: &mut Vec<PositionRecord>,
        ) {
            for (index, node) in nodes.iter().enumerate() {
                out.push(PositionRecord {
                    id: node.id.clone(),
                    parent_id: parent.cloned(),
                    title: node.title.clone(),
                    kind: node.kind,
                    description: node.description.clone(),
                    position_number: Some(index as u32 + 1),
                });
                flatten(&node.children, Some(&node.id), out);
            }
        }

        let mut out = Vec::with_capacity(self.len());
        flatten(&self.roots, None, &mut out);
        out
    }
}

/// Copies canonical scalar fields from records onto matching nodes
struct RecordMerger<'a> {
    records: HashMap<&'a str, &'a PositionRecord>,
    merged: usize,
}

impl VisitorMut for RecordMerger<'_> {
    fn visit_node_mut(&mut self, node: &mut PositionNode, depth: usize) {
        if let Some(record) = self.records.get(node.id.as_str()) {
            node.title = record.title.clone();
            node.description = record.description.clone();
            self.merged += 1;
        }
        walk_node_mut(self, node, depth);
    }
}

fn assemble(
    parent: Option<&PositionId>,
    groups: &mut HashMap<Option<PositionId>, Vec<PositionRecord>>,
) -> Vec<PositionNode> {
    let Some(group) = groups.remove(&parent.cloned()) else {
        return Vec::new();
    };
    group
        .into_iter()
        .map(|record| {
            let children = assemble(Some(&record.id), groups);
            record.into_node(children)
        })
        .collect()
}
