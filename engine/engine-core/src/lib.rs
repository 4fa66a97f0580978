//! Core traits and types shared by the search engine and game implementations
//!
//! This crate defines the minimal capability set the search engine needs from
//! a game:
//! - `GameState`: ordered legal moves, terminal detection, pure move
//!   application, and the tensor/policy encoders used by the evaluator
//! - `GameResult`: the outcome of a finished game
//! - `Side`: the +1/-1 colour multiplier threaded through the search tree

pub mod outcome;
pub mod state;

pub use outcome::{GameResult, Side};
pub use state::GameState;
