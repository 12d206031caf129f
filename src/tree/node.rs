//! Tree node types: id key, per-node observable state, property names.

use slotmap::new_key_type;

use crate::observable::{Observable, PropertyName};

new_key_type! {
    /// Unique identifier for a tree node. Copy, lightweight (u64).
    pub struct TreeNodeId;
}

/// Expansion-state property, raised on observable expand/collapse.
pub const IS_EXPANDED: PropertyName = "IsExpanded";
/// Visibility property, derived from the ancestor chain's expansion.
pub const IS_VISIBLE: PropertyName = "IsVisible";
/// Raised when a node gains its first or loses its last child.
pub const HAS_CHILDREN: PropertyName = "HasChildren";
/// Collection-changed signal, bubbled from a mutated node to the root.
pub const CHILDREN: PropertyName = "Children";

/// A node in a [`TreeModel`](super::TreeModel): user payload, expansion
/// flag, and the node's own observable core.
pub struct TreeNode<T> {
    /// User payload.
    pub data: T,
    pub(crate) expanded: bool,
    events: Observable,
}

impl<T> TreeNode<T> {
    pub(crate) fn new(data: T) -> Self {
        let events = Observable::new();
        for name in [IS_EXPANDED, IS_VISIBLE, HAS_CHILDREN, CHILDREN] {
            events.define(name);
        }
        Self {
            data,
            expanded: false,
            events,
        }
    }

    /// The node's observable core, for monitors on [`IS_EXPANDED`],
    /// [`IS_VISIBLE`], [`HAS_CHILDREN`], and [`CHILDREN`].
    pub fn events(&self) -> &Observable {
        &self.events
    }

    /// Whether this node is expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("data", &self.data)
            .field("expanded", &self.expanded)
            .finish()
    }
}
