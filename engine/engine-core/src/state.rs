//! The game-state capability trait consumed by the search engine.
//!
//! The search engine treats a position as an opaque value. It only needs to
//! enumerate moves in a stable order, detect the end of the game, derive the
//! next position without touching the current one, and hand the evaluator a
//! flat tensor.

use std::fmt::Debug;

use crate::outcome::GameResult;

/// A game position as seen by the search engine.
///
/// # Ordering contract
///
/// `legal_moves` defines index alignment for every per-move vector the
/// engine handles: child nodes, priors, `decode_policy` output and the
/// input of `encode_policy` all use the same order.
///
/// # Terminal contract
///
/// Whenever `is_game_over` is `false`, `legal_moves` must be non-empty.
/// `result` is only meaningful when `is_game_over` is `true`.
///
/// # Example
///
/// ```rust
/// use engine_core::{GameResult, GameState};
///
/// /// A single pile of stones; each turn removes one or two.
/// #[derive(Debug, Clone)]
/// struct Pile {
///     stones: u8,
///     first_to_move: bool,
/// }
///
/// impl GameState for Pile {
///     type Move = u8;
///     const POLICY_SIZE: usize = 2;
///
///     fn legal_moves(&self) -> Vec<u8> {
///         (1..=self.stones.min(2)).collect()
///     }
///     fn is_game_over(&self) -> bool {
///         self.stones == 0
///     }
///     fn result(&self) -> GameResult {
///         // The player who took the last stone wins.
///         if self.first_to_move { GameResult::Loss } else { GameResult::Win }
///     }
///     fn apply(&self, mv: &u8) -> Self {
///         Pile { stones: self.stones - mv, first_to_move: !self.first_to_move }
///     }
///     fn encode(&self) -> Vec<f32> {
///         vec![self.stones as f32]
///     }
///     fn decode_policy(&self, policy: &[f32]) -> Vec<f32> {
///         self.legal_moves().iter().map(|&m| policy[m as usize - 1]).collect()
///     }
///     fn encode_policy(&self, probs: &[f32]) -> Vec<f32> {
///         let mut out = vec![0.0; Self::POLICY_SIZE];
///         for (m, p) in self.legal_moves().iter().zip(probs) {
///             out[*m as usize - 1] = *p;
///         }
///         out
///     }
/// }
///
/// let pile = Pile { stones: 3, first_to_move: true };
/// assert_eq!(pile.legal_moves(), vec![1, 2]);
/// assert!(pile.apply(&2).apply(&1).is_game_over());
/// ```
pub trait GameState: Clone + Send + Sync + Debug + 'static {
    /// Move type; compared for equality only, never hashed or ordered.
    type Move: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Length of the raw policy vector produced by the evaluator.
    const POLICY_SIZE: usize;

    /// Legal moves in a stable order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Whether the game has ended.
    fn is_game_over(&self) -> bool;

    /// Outcome of a finished game from the first player's point of view.
    fn result(&self) -> GameResult;

    /// Position reached by playing `mv`. Must not mutate `self`.
    fn apply(&self, mv: &Self::Move) -> Self;

    /// Network input tensor, flattened.
    fn encode(&self) -> Vec<f32>;

    /// Pick one score per legal move out of a raw `POLICY_SIZE` vector,
    /// in `legal_moves` order.
    fn decode_policy(&self, policy: &[f32]) -> Vec<f32>;

    /// Scatter per-legal-move probabilities back into a `POLICY_SIZE`
    /// vector (training targets).
    fn encode_policy(&self, probs: &[f32]) -> Vec<f32>;
}
