//! Monte Carlo Tree Search for AlphaZero-style self-play.
//!
//! This crate provides a game-agnostic MCTS that works with any position
//! type implementing the `engine-core` [`GameState`](engine_core::GameState)
//! trait.
//!
//! # Overview
//!
//! Every iteration of a search runs four phases:
//!
//! 1. **Selection**: descend from the search root through expanded nodes,
//!    picking the child with the highest PUCT score
//! 2. **Expansion**: at an unexpanded leaf, create one child per legal move
//!    with the normalized policy as priors
//! 3. **Evaluation**: ask the [`Evaluator`] for a value and a policy
//! 4. **Backpropagation**: walk back to the tree root updating visit counts
//!    and value sums
//!
//! A terminal leaf skips expansion and evaluation and backpropagates the
//! game result instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{GameTree, MctsConfig, SearchEngine, UniformEvaluator};
//! use games_tictactoe::Board;
//!
//! let evaluator = UniformEvaluator::new(9);
//! let mut engine = SearchEngine::new(&evaluator, MctsConfig::default());
//!
//! let mut tree = GameTree::new(Board::new());
//! let root = tree.root();
//! let child = engine.search(&mut tree, root, 100)?;
//! println!("Chose {:?}", tree.get(root).child_moves[tree.get(root).child_index(child).unwrap()]);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `iterations`: iterations per ply during self-play (default: 5)
//! - `c_base`, `c_init`: exploration schedule (default: 19652, 1.0)
//! - `max_plies`: self-play game length cap (default: 300)
//! - `seed`: RNG seed for sampling the returned child
//!
//! # Threads
//!
//! A [`GameTree`] belongs to exactly one worker. [`WorkerPool`] runs one tree
//! per thread and shares only the evaluator; models that need exclusive
//! access go through [`SharedEvaluator`].

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod selfplay;
pub mod tree;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use config::{ConfigError, MctsConfig};
pub use evaluator::{
    EvalResult, Evaluator, EvaluatorError, FixedEvaluator, Model, SharedEvaluator,
    UniformEvaluator,
};
pub use node::{GameTreeNode, NodeId};
pub use search::{
    exploration_rate, normalize_priors, puct_score, IterationOutcome, SearchEngine, SearchError,
    SearchStats,
};
pub use selfplay::{
    play_game, EncodedExample, GameRecord, PoolReport, TrainingExample, WorkerPool, WorkerReport,
};
pub use tree::{GameTree, TreeStats};
