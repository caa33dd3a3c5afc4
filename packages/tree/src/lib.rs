//! # Quote Position Tree
//!
//! In-memory hierarchy of quote positions plus the validated structural
//! operations the editor performs on it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ persistence: flat records with parent ids   │
//! └─────────────────────────────────────────────┘
//!                     ↓ from_records
//! ┌─────────────────────────────────────────────┐
//! │ tree: PositionTree                          │
//! │  - locate / depth_of                        │
//! │  - validated move (clone, detach, splice)   │
//! │  - renumber → absolute PositionUpdates      │
//! └─────────────────────────────────────────────┘
//!                     ↓ renumber
//! ┌─────────────────────────────────────────────┐
//! │ persistence: reorder (set absolute order)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use quotetree_tree::{MoveRequest, PositionId, PositionNode, PositionTree};
//!
//! let tree = PositionTree::new(vec![
//!     PositionNode::textblock("x", "X"),
//!     PositionNode::textblock("y", "Y"),
//!     PositionNode::textblock("z", "Z"),
//! ])?;
//!
//! let outcome = tree.move_positions(&MoveRequest::new(["y"], None::<&str>, 0))?;
//! let order: Vec<PositionId> = outcome.tree.renumber().into_iter().map(|u| u.id).collect();
//! assert_eq!(order, vec![PositionId::from("y"), PositionId::from("x"), PositionId::from("z")]);
//! # Ok::<(), quotetree_tree::TreeError>(())
//! ```

mod error;
mod moves;
mod node;
mod records;
mod renumber;
mod tree;
mod validate;
pub mod visitor;

pub use error::{TreeError, ValidationError};
pub use moves::{MoveOutcome, MoveRequest};
pub use node::{PositionField, PositionId, PositionKind, PositionNode};
pub use records::PositionRecord;
pub use renumber::PositionUpdate;
pub use tree::{PositionTree, TreeLimits, DEFAULT_MAX_DEPTH};
pub use validate::validate_roots;
