//! Game tree node representation.
//!
//! Each node owns the position reached by a sequence of moves from the tree
//! root. Child edges are stored on the parent as three index-aligned
//! vectors: child ids, moves and priors.

use engine_core::{GameState, Side};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the game tree.
#[derive(Debug, Clone)]
pub struct GameTreeNode<S: GameState> {
    /// Position at this node, owned exclusively by the node.
    pub state: S,

    /// Parent node (None for the tree root). Lookup only; the arena owns
    /// every node.
    pub parent: Option<NodeId>,

    /// Child nodes, index-aligned with `child_moves` and `child_priors`.
    pub children: Vec<NodeId>,

    /// Move leading to each child.
    pub child_moves: Vec<S::Move>,

    /// Prior probability of each child, fixed at expansion time.
    pub child_priors: Vec<f32>,

    /// Number of backpropagation passes that touched this node.
    pub visit_count: u32,

    /// Accumulated, colour-adjusted value. Not averaged.
    pub value_sum: f64,

    /// Side to move. The tree root is `Side::First`.
    pub color: Side,

    /// Set once the node has been evaluated and its children created.
    pub expanded: bool,

    /// Normalized prior distribution produced when this node was expanded.
    /// Sampled from when this node is the root of a search.
    pub selection_probs: Vec<f32>,

    /// Plies from the tree root.
    pub depth: u32,
}

impl<S: GameState> GameTreeNode<S> {
    /// Create a new root node.
    pub fn new_root(state: S) -> Self {
        Self {
            state,
            parent: None,
            children: Vec::new(),
            child_moves: Vec::new(),
            child_priors: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            color: Side::First,
            expanded: false,
            selection_probs: Vec::new(),
            depth: 0,
        }
    }

    /// Create a child of `parent`, with the opposite side to move.
    pub fn new_child(state: S, parent_id: NodeId, parent: &GameTreeNode<S>) -> Self {
        Self {
            state,
            parent: Some(parent_id),
            children: Vec::new(),
            child_moves: Vec::new(),
            child_priors: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            color: -parent.color,
            expanded: false,
            selection_probs: Vec::new(),
            depth: parent.depth + 1,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Position of `child` among this node's children.
    pub fn child_index(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&id| id == child)
    }

    /// Child reached by `mv`, if the node has been expanded.
    pub fn child_for_move(&self, mv: &S::Move) -> Option<NodeId> {
        self.child_moves
            .iter()
            .position(|m| m == mv)
            .map(|i| self.children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Countdown;

    #[test]
    fn test_new_root() {
        let node = GameTreeNode::new_root(Countdown::new(3));

        assert!(node.is_root());
        assert_eq!(node.visit_count, 0);
        assert_eq!(node.value_sum, 0.0);
        assert_eq!(node.color, Side::First);
        assert_eq!(node.depth, 0);
        assert!(!node.expanded);
        assert!(node.children.is_empty());
        assert!(node.selection_probs.is_empty());
    }

    #[test]
    fn test_new_child_flips_color() {
        let root = GameTreeNode::new_root(Countdown::new(3));
        let child = GameTreeNode::new_child(Countdown::new(2), NodeId(0), &root);
        let grandchild = GameTreeNode::new_child(Countdown::new(1), NodeId(1), &child);

        assert_eq!(child.parent, Some(NodeId(0)));
        assert_eq!(child.color, -root.color);
        assert_eq!(child.depth, 1);
        assert_eq!(grandchild.color, Side::First);
        assert_eq!(grandchild.depth, 2);
    }

    #[test]
    fn test_child_lookup() {
        let mut node = GameTreeNode::new_root(Countdown::new(3));
        node.children = vec![NodeId(1), NodeId(2)];
        node.child_moves = vec![0, 1];
        node.child_priors = vec![0.5, 0.5];

        assert_eq!(node.num_children(), 2);
        assert_eq!(node.child_index(NodeId(2)), Some(1));
        assert_eq!(node.child_index(NodeId(9)), None);
        assert_eq!(node.child_for_move(&1), Some(NodeId(2)));
        assert_eq!(node.child_for_move(&5), None);
    }
}
