//! Tree view-model: structure, derived reads, and notification bubbling.
//!
//! All nodes live in a single slotmap arena; parent/child relationships are
//! stored in secondary maps so removal is O(subtree size) and lookup is O(1).
//! Derived reads (`rank`, `level`, `is_last_item`, `is_visible`) are computed
//! from the current structure on every access — there is no cache to
//! invalidate, so they stay correct after arbitrary insert/add operations.
//!
//! Structural mutations raise one `CHILDREN` signal on the mutated parent
//! and bubble it through every ancestor to the root. Expansion obeys the
//! auto-collapse rule: a node with no children cannot remain expanded; the
//! revert is written under suppression so no `IS_EXPANDED` notification
//! escapes.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use crate::observable::{ChangedArgs, Observable};

use super::node::{TreeNode, TreeNodeId, CHILDREN, HAS_CHILDREN, IS_EXPANDED, IS_VISIBLE};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[TreeNodeId] = &[];

/// Tree of observable view-model nodes carrying a `T` payload.
pub struct TreeModel<T> {
    nodes: SlotMap<TreeNodeId, TreeNode<T>>,
    children: SecondaryMap<TreeNodeId, Vec<TreeNodeId>>,
    parent: SecondaryMap<TreeNodeId, TreeNodeId>,
    root: Option<TreeNodeId>,
}

impl<T> TreeModel<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    // -- structure ---------------------------------------------------------

    /// Insert a root-level node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: T) -> TreeNodeId {
        let id = self.nodes.insert(TreeNode::new(data));
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Append a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: TreeNodeId, data: T) -> TreeNodeId {
        let index = self.children(parent).len();
        self.insert_child(parent, index, data)
    }

    /// Insert a new node among `parent`'s children at `index` (clamped).
    ///
    /// Raises `HAS_CHILDREN` on the parent when it gains its first child,
    /// then bubbles one `CHILDREN` signal from the parent to the root.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: TreeNodeId, index: usize, data: T) -> TreeNodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let had_children = !self.children(parent).is_empty();

        let id = self.nodes.insert(TreeNode::new(data));
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        let siblings = self
            .children
            .get_mut(parent)
            .expect("parent must have children vec");
        let index = index.min(siblings.len());
        siblings.insert(index, id);

        if !had_children {
            self.nodes[parent]
                .events()
                .raise(ChangedArgs::with_values(HAS_CHILDREN, false, true));
        }
        self.bubble_children_changed(parent);
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the removed node's payload, or `None` if it didn't exist.
    /// Raises `HAS_CHILDREN` (and auto-collapses) on a parent left
    /// childless, then bubbles one `CHILDREN` signal from the ex-parent.
    pub fn remove(&mut self, id: TreeNodeId) -> Option<T> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        let parent_id = self.parent.remove(id);
        if let Some(pid) = parent_id {
            if let Some(siblings) = self.children.get_mut(pid) {
                siblings.retain(|&child| child != id);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed = None;
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            let node = self.nodes.remove(current);
            if current == id {
                removed = node;
            }
        }

        if let Some(pid) = parent_id {
            if self.children(pid).is_empty() {
                self.nodes[pid]
                    .events()
                    .raise(ChangedArgs::with_values(HAS_CHILDREN, true, false));
                if self.nodes[pid].expanded {
                    self.collapse_suppressed(pid);
                }
            }
            self.bubble_children_changed(pid);
        }
        removed.map(|node| node.data)
    }

    /// Move `node` (with its subtree) to become the last child of
    /// `new_parent`.
    ///
    /// Bubbles `CHILDREN` from both the old and the new parent and
    /// reconciles the moved subtree's visibility at the new location.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either node does not exist, or if `new_parent`
    /// lies inside the moved subtree.
    pub fn reparent(&mut self, node: TreeNodeId, new_parent: TreeNodeId) {
        debug_assert!(self.nodes.contains_key(node), "node does not exist");
        debug_assert!(
            self.nodes.contains_key(new_parent),
            "new_parent does not exist"
        );
        debug_assert!(
            node != new_parent && !self.ancestors(new_parent).contains(&node),
            "new_parent must not be inside the moved subtree"
        );

        let was_visible = self.is_visible(node);

        // Detach from old parent.
        let old_parent = self.parent.remove(node);
        if let Some(pid) = old_parent {
            if let Some(siblings) = self.children.get_mut(pid) {
                siblings.retain(|&child| child != node);
            }
        }

        // Attach to new parent.
        let same_parent = old_parent == Some(new_parent);
        let had_children = !self.children(new_parent).is_empty();
        self.parent.insert(node, new_parent);
        self.children
            .get_mut(new_parent)
            .expect("new_parent must have children vec")
            .push(node);

        if let Some(pid) = old_parent {
            if !same_parent {
                if self.children(pid).is_empty() {
                    self.nodes[pid]
                        .events()
                        .raise(ChangedArgs::with_values(HAS_CHILDREN, true, false));
                    if self.nodes[pid].expanded {
                        self.collapse_suppressed(pid);
                    }
                }
                self.bubble_children_changed(pid);
            }
        }
        if !same_parent && !had_children {
            self.nodes[new_parent]
                .events()
                .raise(ChangedArgs::with_values(HAS_CHILDREN, false, true));
        }
        self.bubble_children_changed(new_parent);

        let now_visible = self.is_visible(node);
        if was_visible != now_visible {
            self.nodes[node]
                .events()
                .raise(ChangedArgs::with_values(IS_VISIBLE, was_visible, now_visible));
            if self.nodes[node].expanded {
                if now_visible {
                    self.reveal_children(node);
                } else {
                    self.collapse_suppressed(node);
                    self.hide_children(node);
                }
            }
        }
    }

    // -- expansion ---------------------------------------------------------

    /// Flip a node's expansion state.
    ///
    /// A node with no children cannot remain expanded: the write auto-reverts
    /// under suppression and no `IS_EXPANDED` notification escapes. A real
    /// flip raises `IS_EXPANDED`, then reconciles every direct child's
    /// `IS_VISIBLE`; a child hidden while itself expanded is cascade-collapsed.
    pub fn set_expanded(&mut self, id: TreeNodeId, expanded: bool) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let old = node.expanded;
        if expanded == old {
            return;
        }

        if expanded && self.children(id).is_empty() {
            // Auto-collapse: write and revert under suppression; the final
            // value equals the captured one, so restore stays silent.
            let events = node.events().clone();
            events.suppress(IS_EXPANDED, old);
            self.nodes[id].expanded = true;
            events.raise(ChangedArgs::with_values(IS_EXPANDED, old, true));
            self.nodes[id].expanded = false;
            events.raise(ChangedArgs::with_values(IS_EXPANDED, true, false));
            events.restore(IS_EXPANDED, false);
            return;
        }

        let was_visible = self.is_visible(id);
        self.nodes[id].expanded = expanded;
        self.nodes[id]
            .events()
            .raise(ChangedArgs::with_values(IS_EXPANDED, old, expanded));

        // Children visibility only changes when the node itself is visible.
        if was_visible {
            if expanded {
                self.reveal_children(id);
            } else {
                self.hide_children(id);
            }
        }
    }

    /// Collapse a node whose expansion is no longer tenable, under
    /// suppression: the internal flips collapse to one reconciliation
    /// notification.
    fn collapse_suppressed(&mut self, id: TreeNodeId) {
        let events = self.nodes[id].events().clone();
        events.suppress(IS_EXPANDED, true);
        self.nodes[id].expanded = false;
        events.raise(ChangedArgs::with_values(IS_EXPANDED, true, false));
        events.restore(IS_EXPANDED, false);
    }

    fn hide_children(&mut self, id: TreeNodeId) {
        let kids: Vec<TreeNodeId> = self.children(id).to_vec();
        for child in kids {
            self.nodes[child]
                .events()
                .raise(ChangedArgs::with_values(IS_VISIBLE, true, false));
            if self.nodes[child].expanded {
                self.collapse_suppressed(child);
                self.hide_children(child);
            }
        }
    }

    fn reveal_children(&mut self, id: TreeNodeId) {
        let kids: Vec<TreeNodeId> = self.children(id).to_vec();
        for child in kids {
            self.nodes[child]
                .events()
                .raise(ChangedArgs::with_values(IS_VISIBLE, false, true));
            if self.nodes[child].expanded {
                self.reveal_children(child);
            }
        }
    }

    /// Raise one `CHILDREN` signal on `start` and every ancestor up to the
    /// root.
    fn bubble_children_changed(&self, start: TreeNodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            self.nodes[id].events().raise(ChangedArgs::name_only(CHILDREN));
            current = self.parent.get(id).copied();
        }
    }

    // -- derived reads -----------------------------------------------------

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Empty if the node has no children or
    /// does not exist.
    pub fn children(&self, id: TreeNodeId) -> &[TreeNodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<TreeNodeId> {
        self.root
    }

    /// Whether the node has no parent.
    pub fn is_root(&self, id: TreeNodeId) -> bool {
        self.nodes.contains_key(id) && self.parent.get(id).is_none()
    }

    /// Number of ancestors between the node and the root.
    pub fn rank(&self, id: TreeNodeId) -> usize {
        self.ancestors(id).len()
    }

    /// 1-based depth: `rank + 1`.
    pub fn level(&self, id: TreeNodeId) -> usize {
        self.rank(id) + 1
    }

    /// Whether the node is the last of its parent's children. Parentless
    /// nodes count as last.
    pub fn is_last_item(&self, id: TreeNodeId) -> bool {
        match self.parent.get(id) {
            Some(&pid) => self.children(pid).last() == Some(&id),
            None => true,
        }
    }

    /// Whether the node has children.
    pub fn has_children(&self, id: TreeNodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Whether every ancestor is expanded. Nodes without ancestors are
    /// visible.
    pub fn is_visible(&self, id: TreeNodeId) -> bool {
        self.ancestors(id)
            .iter()
            .all(|&ancestor| self.nodes[ancestor].expanded)
    }

    /// Whether the node is expanded. Nonexistent nodes are collapsed.
    pub fn is_expanded(&self, id: TreeNodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.expanded)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// Does **not** include `id` itself; starts with the immediate parent
    /// and ends at the root.
    pub fn ancestors(&self, id: TreeNodeId) -> Vec<TreeNodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Pre-order traversal of the currently visible nodes, from the root.
    /// Collapsed subtrees contribute only their (visible) root.
    pub fn visible(&self) -> Vec<TreeNodeId> {
        let mut result = Vec::new();
        let Some(root) = self.root else {
            return result;
        };
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            result.push(current);
            if self.nodes[current].expanded {
                for &child in self.children(current).iter().rev() {
                    stack.push(child);
                }
            }
        }
        result
    }

    // -- access ------------------------------------------------------------

    /// Immutable access to a node.
    pub fn get(&self, id: TreeNodeId) -> Option<&TreeNode<T>> {
        self.nodes.get(id)
    }

    /// Mutable access to a node. Expansion state is only writable through
    /// [`set_expanded`](Self::set_expanded).
    pub fn get_mut(&mut self, id: TreeNodeId) -> Option<&mut TreeNode<T>> {
        self.nodes.get_mut(id)
    }

    /// A node's observable core, for attaching monitors.
    pub fn events(&self, id: TreeNodeId) -> Option<&Observable> {
        self.nodes.get(id).map(TreeNode::events)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: TreeNodeId) -> bool {
        self.nodes.contains_key(id)
    }
}

impl<T> Default for TreeModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (
        TreeModel<&'static str>,
        TreeNodeId,
        TreeNodeId,
        TreeNodeId,
        TreeNodeId,
        TreeNodeId,
    ) {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let a = tree.add_child(root, "a");
        let b = tree.add_child(root, "b");
        let c = tree.add_child(a, "c");
        let d = tree.add_child(a, "d");
        (tree, root, a, b, c, d)
    }

    fn count_raises<T>(tree: &TreeModel<T>, id: TreeNodeId, property: &'static str) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        tree.events(id)
            .unwrap()
            .monitor(property)
            .unwrap()
            .on_changed(move || c.set(c.get() + 1));
        count
    }

    // ── Structure ────────────────────────────────────────────────────

    #[test]
    fn insert_sets_root() {
        let mut tree = TreeModel::new();
        let id = tree.insert("root");
        assert_eq!(tree.root(), Some(id));
        assert!(tree.is_root(id));
    }

    #[test]
    fn parent_child_relationships() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.children(root), &[a, _b]);
        assert_eq!(tree.ancestors(c), vec![a, root]);
    }

    #[test]
    fn insert_child_at_index() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let x = tree.add_child(root, "x");
        let z = tree.add_child(root, "z");
        let y = tree.insert_child(root, 1, "y");
        assert_eq!(tree.children(root), &[x, y, z]);
    }

    #[test]
    fn insert_child_index_is_clamped() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let x = tree.add_child(root, "x");
        let y = tree.insert_child(root, 99, "y");
        assert_eq!(tree.children(root), &[x, y]);
    }

    // ── Derived reads ────────────────────────────────────────────────

    #[test]
    fn rank_and_level() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.rank(root), 0);
        assert_eq!(tree.level(root), 1);
        assert_eq!(tree.rank(a), 1);
        assert_eq!(tree.rank(c), 2);
        assert_eq!(tree.level(c), 3);
    }

    #[test]
    fn is_last_item() {
        let (tree, root, a, b, c, d) = build_tree();
        assert!(tree.is_last_item(root));
        assert!(!tree.is_last_item(a));
        assert!(tree.is_last_item(b));
        assert!(!tree.is_last_item(c));
        assert!(tree.is_last_item(d));
    }

    #[test]
    fn derived_reads_stay_correct_after_inserts() {
        // No caching: inserting siblings reshuffles is_last_item on its own.
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let a = tree.add_child(root, "a");
        assert!(tree.is_last_item(a));
        let b = tree.add_child(root, "b");
        assert!(!tree.is_last_item(a));
        assert!(tree.is_last_item(b));

        let c = tree.insert_child(a, 0, "c");
        assert_eq!(tree.rank(c), 2);
        tree.reparent(c, root);
        assert_eq!(tree.rank(c), 1);
        assert!(tree.is_last_item(c));
    }

    #[test]
    fn has_children() {
        let (tree, root, a, b, ..) = build_tree();
        assert!(tree.has_children(root));
        assert!(tree.has_children(a));
        assert!(!tree.has_children(b));
    }

    // ── Visibility and expansion ─────────────────────────────────────

    #[test]
    fn collapsed_ancestors_hide_descendants() {
        let (mut tree, root, a, b, c, _d) = build_tree();
        // Everything starts collapsed; only the root is visible.
        assert!(tree.is_visible(root));
        assert!(!tree.is_visible(a));
        assert!(!tree.is_visible(c));

        tree.set_expanded(root, true);
        assert!(tree.is_visible(a));
        assert!(tree.is_visible(b));
        assert!(!tree.is_visible(c)); // a still collapsed

        tree.set_expanded(a, true);
        assert!(tree.is_visible(c));
    }

    #[test]
    fn expanding_leaf_auto_reverts_silently() {
        let (mut tree, _root, _a, b, ..) = build_tree();
        let raises = count_raises(&tree, b, IS_EXPANDED);

        tree.set_expanded(b, true);
        assert!(!tree.is_expanded(b));
        assert_eq!(raises.get(), 0);
    }

    #[test]
    fn expanding_parent_raises_and_reveals() {
        let (mut tree, root, a, b, ..) = build_tree();
        let expanded_raises = count_raises(&tree, root, IS_EXPANDED);
        let a_visible_raises = count_raises(&tree, a, IS_VISIBLE);
        let b_visible_raises = count_raises(&tree, b, IS_VISIBLE);

        tree.set_expanded(root, true);
        assert_eq!(expanded_raises.get(), 1);
        assert_eq!(a_visible_raises.get(), 1);
        assert_eq!(b_visible_raises.get(), 1);
    }

    #[test]
    fn set_expanded_same_value_is_silent() {
        let (mut tree, root, ..) = build_tree();
        let raises = count_raises(&tree, root, IS_EXPANDED);
        tree.set_expanded(root, false);
        assert_eq!(raises.get(), 0);
    }

    #[test]
    fn collapsing_cascades_to_expanded_children() {
        let (mut tree, root, a, _b, c, _d) = build_tree();
        tree.set_expanded(root, true);
        tree.set_expanded(a, true);
        assert!(tree.is_visible(c));

        let a_visible = count_raises(&tree, a, IS_VISIBLE);
        let a_expanded = count_raises(&tree, a, IS_EXPANDED);
        let c_visible = count_raises(&tree, c, IS_VISIBLE);

        tree.set_expanded(root, false);
        assert!(!tree.is_visible(a));
        // a was hidden while expanded: cascade-collapsed with a single
        // reconciliation notification, and its children went hidden too.
        assert!(!tree.is_expanded(a));
        assert_eq!(a_visible.get(), 1);
        assert_eq!(a_expanded.get(), 1);
        assert_eq!(c_visible.get(), 1);
    }

    #[test]
    fn expanding_hidden_node_does_not_touch_visibility() {
        let (mut tree, _root, a, _b, c, _d) = build_tree();
        // root stays collapsed: a is visible? a's ancestors = [root], root
        // collapsed -> a hidden.
        assert!(!tree.is_visible(c));
        let c_visible = count_raises(&tree, c, IS_VISIBLE);

        tree.set_expanded(a, true);
        assert!(tree.is_expanded(a));
        assert_eq!(c_visible.get(), 0);
        assert!(!tree.is_visible(c));
    }

    #[test]
    fn visible_walk_respects_expansion() {
        let (mut tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.visible(), vec![root]);
        tree.set_expanded(root, true);
        assert_eq!(tree.visible(), vec![root, a, b]);
        tree.set_expanded(a, true);
        assert_eq!(tree.visible(), vec![root, a, c, d, b]);
    }

    // ── Structural bubbling ──────────────────────────────────────────

    #[test]
    fn add_child_bubbles_once_to_root() {
        let (mut tree, root, a, ..) = build_tree();
        let root_signals = count_raises(&tree, root, CHILDREN);
        let a_signals = count_raises(&tree, a, CHILDREN);

        tree.add_child(a, "e");
        assert_eq!(a_signals.get(), 1);
        assert_eq!(root_signals.get(), 1);
    }

    #[test]
    fn deep_insert_still_one_root_observation() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let mut current = root;
        for _ in 0..10 {
            current = tree.add_child(current, "n");
        }
        let root_signals = count_raises(&tree, root, CHILDREN);

        tree.add_child(current, "leaf");
        assert_eq!(root_signals.get(), 1);
    }

    #[test]
    fn first_child_raises_has_children() {
        let (mut tree, _root, _a, b, ..) = build_tree();
        let raises = count_raises(&tree, b, HAS_CHILDREN);
        tree.add_child(b, "e");
        assert_eq!(raises.get(), 1);
        // A second child does not re-raise.
        tree.add_child(b, "f");
        assert_eq!(raises.get(), 1);
    }

    // ── Removal ──────────────────────────────────────────────────────

    #[test]
    fn remove_leaf_returns_payload() {
        let (mut tree, _root, a, _b, c, d) = build_tree();
        assert_eq!(tree.remove(c), Some("c"));
        assert!(!tree.contains(c));
        assert_eq!(tree.children(a), &[d]);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut tree, root, a, b, c, d) = build_tree();
        tree.remove(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_nonexistent_returns_none() {
        let (mut tree, _root, _a, _b, c, _d) = build_tree();
        tree.remove(c);
        assert!(tree.remove(c).is_none());
    }

    #[test]
    fn remove_bubbles_from_ex_parent() {
        let (mut tree, root, _a, _b, c, _d) = build_tree();
        let root_signals = count_raises(&tree, root, CHILDREN);
        tree.remove(c);
        assert_eq!(root_signals.get(), 1);
    }

    #[test]
    fn remove_last_child_collapses_expanded_parent() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let a = tree.add_child(root, "a");
        let b = tree.add_child(a, "b");
        tree.set_expanded(root, true);
        tree.set_expanded(a, true);

        let has_children = count_raises(&tree, a, HAS_CHILDREN);
        tree.remove(b);
        assert!(!tree.has_children(a));
        assert!(!tree.is_expanded(a));
        assert_eq!(has_children.get(), 1);
    }

    // ── Reparent ─────────────────────────────────────────────────────

    #[test]
    fn reparent_moves_subtree() {
        let (mut tree, root, a, b, c, _d) = build_tree();
        tree.reparent(c, b);
        assert_eq!(tree.parent(c), Some(b));
        assert!(!tree.children(a).contains(&c));
        assert!(tree.children(b).contains(&c));
        assert_eq!(tree.ancestors(c), vec![b, root]);
    }

    #[test]
    fn reparent_bubbles_from_both_parents() {
        let (mut tree, root, a, b, c, _d) = build_tree();
        let root_signals = count_raises(&tree, root, CHILDREN);
        let a_signals = count_raises(&tree, a, CHILDREN);
        let b_signals = count_raises(&tree, b, CHILDREN);

        tree.reparent(c, b);
        assert_eq!(a_signals.get(), 1);
        assert_eq!(b_signals.get(), 1);
        // Root sees one bubble per affected parent chain.
        assert_eq!(root_signals.get(), 2);
    }

    #[test]
    fn reparent_updates_has_children_on_both_ends() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let a = tree.add_child(root, "a");
        let b = tree.add_child(root, "b");
        let c = tree.add_child(a, "c");

        let a_has = count_raises(&tree, a, HAS_CHILDREN);
        let b_has = count_raises(&tree, b, HAS_CHILDREN);

        tree.reparent(c, b);
        assert!(!tree.has_children(a));
        assert!(tree.has_children(b));
        assert_eq!(a_has.get(), 1);
        assert_eq!(b_has.get(), 1);
    }

    #[test]
    fn reparent_into_hidden_location_hides_subtree() {
        let mut tree = TreeModel::new();
        let root = tree.insert("root");
        let open = tree.add_child(root, "open");
        let closed = tree.add_child(root, "closed");
        let moved = tree.add_child(open, "moved");
        let _grand = tree.add_child(closed, "grand");
        tree.set_expanded(root, true);
        tree.set_expanded(open, true);
        assert!(tree.is_visible(moved));

        let visible_raises = count_raises(&tree, moved, IS_VISIBLE);
        tree.reparent(moved, closed);
        assert!(!tree.is_visible(moved));
        assert_eq!(visible_raises.get(), 1);
    }

    // ── Payload access ───────────────────────────────────────────────

    #[test]
    fn get_and_get_mut() {
        let (mut tree, _root, a, ..) = build_tree();
        assert_eq!(tree.get(a).unwrap().data, "a");
        tree.get_mut(a).unwrap().data = "renamed";
        assert_eq!(tree.get(a).unwrap().data, "renamed");
    }

    #[test]
    fn default_is_empty() {
        let tree: TreeModel<()> = TreeModel::default();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.len(), 0);
    }
}
