//! MCTS search implementation.
//!
//! Each iteration runs the four phases in order:
//! 1. Selection: descend from the search root while nodes are expanded
//! 2. Terminal check: finished positions backpropagate their result
//! 3. Evaluation + expansion: one evaluator call yields the priors for every
//!    child of the leaf and the value to backpropagate
//! 4. Backpropagation: update statistics from the leaf up to the tree root
//!
//! After all iterations a child of the search root is sampled from the
//! root's own prior distribution.

use std::time::Instant;

use engine_core::GameState;
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::GameTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Search root is a finished game; there is no child to return")]
    GameOver,

    #[error("Search root was never expanded; run at least one iteration")]
    Unexpanded,

    #[error("Cannot sample from root priors: {0}")]
    InvalidDistribution(String),
}

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Reached a finished position and backpropagated its result.
    Terminal(NodeId),
    /// Evaluated and expanded a leaf.
    Expanded(NodeId),
}

/// Counters accumulated over the lifetime of a [`SearchEngine`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Iterations run
    pub iterations: u64,
    /// Evaluator calls made
    pub evaluations: u64,
    /// Iterations that ended on a finished position
    pub terminal_hits: u64,
    /// Nodes created by expansion
    pub nodes_created: u64,
    /// Wall-clock time spent inside `search` (microseconds)
    pub total_time_us: u64,
    /// Time spent waiting on the evaluator, lock included (microseconds)
    pub inference_time_us: u64,
}

impl SearchStats {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &SearchStats) {
        self.iterations += other.iterations;
        self.evaluations += other.evaluations;
        self.terminal_hits += other.terminal_hits;
        self.nodes_created += other.nodes_created;
        self.total_time_us += other.total_time_us;
        self.inference_time_us += other.inference_time_us;
    }
}

/// Exploration rate for a node with `parent_visits` visits:
/// c(N) = ln((N + c_base + 1) / c_base) + c_init
#[inline]
pub fn exploration_rate(parent_visits: u32, config: &MctsConfig) -> f64 {
    let n = parent_visits as f64;
    let c_base = config.c_base as f64;
    ((n + c_base + 1.0) / c_base).ln() + config.c_init as f64
}

/// Selection score of one child.
///
/// q = value_sum + visit_count (accumulated, not averaged)
/// score = q + c * prior * sqrt(N_parent / (1 + N_child))
#[inline]
pub fn puct_score(
    child_value_sum: f64,
    child_visits: u32,
    prior: f32,
    parent_visits: u32,
    exploration: f64,
) -> f64 {
    let q = child_value_sum + child_visits as f64;
    let u = exploration
        * prior as f64
        * (parent_visits as f64 / (1.0 + child_visits as f64)).sqrt();
    q + u
}

/// Normalize per-move priors to sum to 1.
///
/// An all-zero vector (or one whose sum is not finite) is replaced by a
/// vector of ones before normalizing, so the result is uniform.
pub fn normalize_priors(mut probs: Vec<f32>) -> Vec<f32> {
    let mut sum: f32 = probs.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        probs.iter_mut().for_each(|p| *p = 1.0);
        sum = probs.len() as f32;
    }
    let factor = 1.0 / sum;
    probs.iter_mut().for_each(|p| *p *= factor);
    probs
}

/// MCTS search engine.
///
/// Owns its configuration, RNG and counters; borrows the evaluator so that
/// several engines on different threads can share one.
pub struct SearchEngine<'a, E: Evaluator + ?Sized> {
    evaluator: &'a E,
    config: MctsConfig,
    rng: ChaCha20Rng,
    stats: SearchStats,
}

impl<'a, E: Evaluator + ?Sized> SearchEngine<'a, E> {
    /// Create an engine whose RNG is seeded from `config.seed`.
    pub fn new(evaluator: &'a E, config: MctsConfig) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(config.seed);
        Self::with_rng(evaluator, config, rng)
    }

    /// Create an engine with an explicit RNG.
    pub fn with_rng(evaluator: &'a E, config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            evaluator,
            config,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run `iterations` iterations below `root` and return a sampled child.
    ///
    /// The child is drawn from `root.selection_probs`, the normalized priors
    /// stored when the root was expanded, not from visit counts.
    pub fn search<S: GameState>(
        &mut self,
        tree: &mut GameTree<S>,
        root: NodeId,
        iterations: u32,
    ) -> Result<NodeId, SearchError> {
        let start = Instant::now();
        let mut terminal_hits = 0u32;

        for _ in 0..iterations {
            if let IterationOutcome::Terminal(_) = self.run_iteration(tree, root)? {
                terminal_hits += 1;
            }
        }

        self.stats.total_time_us += start.elapsed().as_micros() as u64;

        debug!(
            root = root.0,
            iterations,
            terminal_hits,
            root_visits = tree.get(root).visit_count,
            tree_size = tree.len(),
            "MCTS search complete"
        );

        self.sample_child(tree, root)
    }

    /// Run a single iteration below `root`.
    pub fn run_iteration<S: GameState>(
        &mut self,
        tree: &mut GameTree<S>,
        root: NodeId,
    ) -> Result<IterationOutcome, SearchError> {
        self.stats.iterations += 1;

        // Selection: descend to the first unexpanded node
        let mut leaf = root;
        while tree.get(leaf).expanded {
            leaf = self.select(tree, leaf);
        }

        let state = &tree.get(leaf).state;

        // Finished positions are never expanded
        if state.is_game_over() {
            let value = state.result().value();
            tree.backpropagate(leaf, value as f64);
            self.stats.terminal_hits += 1;
            trace!(leaf = leaf.0, value, "terminal leaf");
            return Ok(IterationOutcome::Terminal(leaf));
        }

        let num_moves = state.legal_moves().len();
        assert!(
            num_moves > 0,
            "position is not game over but has no legal moves: {:?}",
            state
        );

        // Evaluation
        let encoded = state.encode();
        let inference_start = Instant::now();
        let eval = self.evaluator.evaluate(&encoded)?;
        self.stats.inference_time_us += inference_start.elapsed().as_micros() as u64;
        self.stats.evaluations += 1;

        if eval.policy.len() != S::POLICY_SIZE {
            return Err(EvaluatorError::MalformedOutput {
                expected: S::POLICY_SIZE,
                actual: eval.policy.len(),
            }
            .into());
        }
        let probs = state.decode_policy(&eval.policy);
        if probs.len() != num_moves {
            return Err(EvaluatorError::MalformedOutput {
                expected: num_moves,
                actual: probs.len(),
            }
            .into());
        }

        // Expansion
        let probs = normalize_priors(probs);
        tree.expand(leaf, probs);
        self.stats.nodes_created += num_moves as u64;

        // Backpropagation
        tree.backpropagate(leaf, eval.value as f64);

        trace!(
            leaf = leaf.0,
            depth = tree.get(leaf).depth,
            value = eval.value,
            children = num_moves,
            "expanded leaf"
        );

        Ok(IterationOutcome::Expanded(leaf))
    }

    /// Pick the child of `node_id` with the highest selection score.
    ///
    /// Ties go to the lowest index. A NaN score never wins.
    ///
    /// # Panics
    ///
    /// Panics if the node has no children.
    pub fn select<S: GameState>(&self, tree: &GameTree<S>, node_id: NodeId) -> NodeId {
        let node = tree.get(node_id);
        let exploration = exploration_rate(node.visit_count, &self.config);

        let mut best: Option<(usize, f64)> = None;
        for (i, (&child_id, &prior)) in node.children.iter().zip(&node.child_priors).enumerate() {
            let child = tree.get(child_id);
            let score = puct_score(
                child.value_sum,
                child.visit_count,
                prior,
                node.visit_count,
                exploration,
            );
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }

        let index = best.map(|(i, _)| i).unwrap_or(0);
        node.children[index]
    }

    /// Sample a child of `root` from its stored prior distribution.
    pub fn sample_child<S: GameState>(
        &mut self,
        tree: &GameTree<S>,
        root: NodeId,
    ) -> Result<NodeId, SearchError> {
        let node = tree.get(root);
        if node.children.is_empty() {
            return Err(if node.state.is_game_over() {
                SearchError::GameOver
            } else {
                SearchError::Unexpanded
            });
        }

        let dist = WeightedIndex::new(&node.selection_probs)
            .map_err(|e| SearchError::InvalidDistribution(e.to_string()))?;
        Ok(node.children[dist.sample(&mut self.rng)])
    }
}
