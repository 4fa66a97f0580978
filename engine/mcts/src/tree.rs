//! Game tree with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices.
//! Parent links are plain indices, so ownership flows only from the arena
//! and there are no reference cycles between parents and children.

use engine_core::GameState;
use tracing::warn;

use crate::node::{GameTreeNode, NodeId};

/// Game tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct GameTree<S: GameState> {
    /// Arena storing all nodes
    nodes: Vec<GameTreeNode<S>>,

    /// Root node index (always 0)
    root: NodeId,
}

impl<S: GameState> GameTree<S> {
    /// Create a new tree holding only a root for `root_state`.
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![GameTreeNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &GameTreeNode<S> {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut GameTreeNode<S> {
        &mut self.nodes[id.index()]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[GameTreeNode<S>] {
        &self.nodes
    }

    /// Add a child to a parent node and return the new child's NodeId.
    ///
    /// The child gets the opposite side to move; the move and prior are
    /// appended to the parent's index-aligned edge vectors.
    pub fn add_child(&mut self, parent_id: NodeId, state: S, mv: S::Move, prior: f32) -> NodeId {
        let child = GameTreeNode::new_child(state, parent_id, self.get(parent_id));
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(child);

        let parent = self.get_mut(parent_id);
        parent.children.push(child_id);
        parent.child_moves.push(mv);
        parent.child_priors.push(prior);

        child_id
    }

    /// Expand a node: one child per legal move, all at once.
    ///
    /// `probs` holds one normalized prior per legal move, in `legal_moves`
    /// order; it becomes both the child priors and the node's own
    /// `selection_probs`. Returns `false` without touching the tree if the
    /// node was already expanded.
    ///
    /// # Panics
    ///
    /// Panics if `probs` and the legal move list differ in length.
    pub fn expand(&mut self, node_id: NodeId, probs: Vec<f32>) -> bool {
        if self.get(node_id).expanded {
            warn!(node = node_id.0, "refusing to re-expand node");
            return false;
        }

        let moves = self.get(node_id).state.legal_moves();
        assert_eq!(
            moves.len(),
            probs.len(),
            "one prior per legal move is required"
        );

        for (mv, &prior) in moves.into_iter().zip(probs.iter()) {
            let next = self.get(node_id).state.apply(&mv);
            self.add_child(node_id, next, mv, prior);
        }

        let node = self.get_mut(node_id);
        node.expanded = true;
        node.selection_probs = probs;
        true
    }

    /// Backpropagate a value from `node_id` up to the tree root.
    ///
    /// Each node on the way increments its visit count and adds the incoming
    /// value times its colour to `value_sum`. The value handed to the parent
    /// is the node's own accumulated `value_sum`, not the incoming value, so
    /// the propagated quantity compounds with repeated visits.
    pub fn backpropagate(&mut self, node_id: NodeId, value: f64) {
        let mut current = Some(node_id);
        let mut incoming = value;

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visit_count += 1;
            node.value_sum += incoming * node.color.sign();

            incoming = node.value_sum;
            current = node.parent;
        }
    }

    /// Visit distribution over a node's children, used as a training target.
    ///
    /// Each entry is `child.visit_count / node.visit_count`, renormalized to
    /// sum to 1. If the node has no visits, or its children have none, the
    /// result is a vector of 1.0 per legal move. That fallback is not a
    /// probability vector; renormalize before treating it as one.
    pub fn actual_visit_probabilities(&self, node_id: NodeId) -> Vec<f32> {
        let node = self.get(node_id);
        let uniform = || vec![1.0; node.state.legal_moves().len()];

        if node.visit_count == 0 {
            return uniform();
        }

        let parent_visits = node.visit_count as f32;
        let probs: Vec<f32> = node
            .children
            .iter()
            .map(|&id| self.get(id).visit_count as f32 / parent_visits)
            .collect();

        let total: f32 = probs.iter().sum();
        if total == 0.0 {
            return uniform();
        }

        probs.into_iter().map(|p| p / total).collect()
    }

    /// Node ids from `node_id` up to and including the tree root.
    pub fn path_to_root(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut path = vec![node_id];
        let mut current = self.get(node_id).parent;
        while let Some(id) = current {
            path.push(id);
            current = self.get(id).parent;
        }
        path
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            expanded_nodes: self.nodes.iter().filter(|n| n.expanded).count(),
            root_visits: root.visit_count,
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

/// Statistics about a game tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub expanded_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Countdown;
    use engine_core::Side;

    #[test]
    fn test_new_tree() {
        let tree = GameTree::new(Countdown::new(3));

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.color, Side::First);
        assert_eq!(root.state, Countdown::new(3));
    }

    #[test]
    fn test_add_child() {
        let mut tree = GameTree::new(Countdown::new(3));

        let child_id = tree.add_child(tree.root(), Countdown::new(2), 1, 0.25);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));

        let root = tree.get(tree.root());
        assert_eq!(root.children, vec![NodeId(1)]);
        assert_eq!(root.child_moves, vec![1]);
        assert_eq!(root.child_priors, vec![0.25]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, Some(tree.root()));
        assert_eq!(child.color, Side::Second);
        assert_eq!(child.depth, 1);
    }

    #[test]
    fn test_expand_creates_aligned_children() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();

        assert!(tree.expand(root, vec![0.7, 0.3]));

        let node = tree.get(root);
        assert!(node.expanded);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.child_moves.len(), 2);
        assert_eq!(node.child_priors.len(), 2);
        assert_eq!(node.child_moves, vec![0, 1]);
        assert_eq!(node.child_priors, vec![0.7, 0.3]);
        assert_eq!(node.selection_probs, vec![0.7, 0.3]);

        for &child in &node.children {
            let child = tree.get(child);
            assert_eq!(child.state, Countdown::new(2));
            assert_eq!(child.color, -node.color);
            assert!(!child.expanded);
        }
    }

    #[test]
    fn test_expand_twice_is_a_no_op() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();

        assert!(tree.expand(root, vec![0.6, 0.4]));
        let children = tree.get(root).children.clone();

        assert!(!tree.expand(root, vec![0.1, 0.9]));

        let node = tree.get(root);
        assert!(node.expanded);
        assert_eq!(node.children, children);
        assert_eq!(node.child_priors, vec![0.6, 0.4]);
        assert_eq!(node.selection_probs, vec![0.6, 0.4]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    #[should_panic(expected = "one prior per legal move")]
    fn test_expand_rejects_mismatched_priors() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        tree.expand(root, vec![1.0]);
    }

    #[test]
    fn test_backpropagate_single_node() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();

        tree.backpropagate(root, 1.0);

        let node = tree.get(root);
        assert_eq!(node.visit_count, 1);
        assert!((node.value_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_backpropagate_compounds_accumulated_sums() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        let child = tree.add_child(root, Countdown::new(2), 0, 1.0);
        let grandchild = tree.add_child(child, Countdown::new(1), 0, 1.0);

        // grandchild (First): 0.5 * +1 = 0.5
        // child (Second):     0.5 * -1 = -0.5
        // root (First):      -0.5 * +1 = -0.5
        tree.backpropagate(grandchild, 0.5);
        assert!((tree.get(grandchild).value_sum - 0.5).abs() < 1e-9);
        assert!((tree.get(child).value_sum + 0.5).abs() < 1e-9);
        assert!((tree.get(root).value_sum + 0.5).abs() < 1e-9);

        // grandchild: 0.5 + 0.5 = 1.0, passes 1.0 up
        // child:     -0.5 - 1.0 = -1.5, passes -1.5 up
        // root:      -0.5 - 1.5 = -2.0
        tree.backpropagate(grandchild, 0.5);
        assert!((tree.get(grandchild).value_sum - 1.0).abs() < 1e-9);
        assert!((tree.get(child).value_sum + 1.5).abs() < 1e-9);
        assert!((tree.get(root).value_sum + 2.0).abs() < 1e-9);

        for id in [root, child, grandchild] {
            assert_eq!(tree.get(id).visit_count, 2);
        }
    }

    #[test]
    fn test_backpropagate_deep_chain_is_iterative() {
        let depth = 50_000;
        let mut tree = GameTree::new(Countdown::new(depth));
        let mut leaf = tree.root();
        for i in 1..=depth {
            leaf = tree.add_child(leaf, Countdown::new(depth - i), 0, 1.0);
        }

        tree.backpropagate(leaf, 0.0);

        assert_eq!(tree.get(tree.root()).visit_count, 1);
        assert_eq!(tree.get(leaf).depth, depth);
    }

    #[test]
    fn test_visit_probabilities_fallback_without_visits() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        tree.expand(root, vec![0.5, 0.5]);

        assert_eq!(tree.actual_visit_probabilities(root), vec![1.0, 1.0]);
    }

    #[test]
    fn test_visit_probabilities_fallback_when_children_unvisited() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        tree.backpropagate(root, 0.0);

        // Visited but never expanded: children sum to zero.
        assert_eq!(tree.actual_visit_probabilities(root), vec![1.0, 1.0]);
    }

    #[test]
    fn test_visit_probabilities_normalized() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        tree.expand(root, vec![0.5, 0.5]);
        let children = tree.get(root).children.clone();

        tree.get_mut(root).visit_count = 10;
        tree.get_mut(children[0]).visit_count = 3;
        tree.get_mut(children[1]).visit_count = 6;

        let probs = tree.actual_visit_probabilities(root);
        assert_eq!(probs.len(), 2);
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((probs[1] - 2.0 / 3.0).abs() < 1e-6);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_path_to_root() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        let child = tree.add_child(root, Countdown::new(2), 0, 1.0);
        let grandchild = tree.add_child(child, Countdown::new(1), 1, 1.0);

        assert_eq!(tree.path_to_root(grandchild), vec![grandchild, child, root]);
        assert_eq!(tree.path_to_root(root), vec![root]);
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = GameTree::new(Countdown::new(3));
        let root = tree.root();
        tree.expand(root, vec![0.5, 0.5]);
        tree.backpropagate(root, 0.0);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.expanded_nodes, 1);
        assert_eq!(stats.root_visits, 1);
        assert_eq!(stats.max_depth, 1);
    }
}
