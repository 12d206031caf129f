//! Tree view-models: slotmap arena, derived reads, notification bubbling.

pub mod model;
pub mod node;

pub use model::TreeModel;
pub use node::{TreeNode, TreeNodeId, CHILDREN, HAS_CHILDREN, IS_EXPANDED, IS_VISIBLE};
