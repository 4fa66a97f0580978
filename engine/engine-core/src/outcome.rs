//! Game outcomes and the side-to-move multiplier.

use std::fmt;
use std::ops::Neg;

/// Result of a finished game, always from the first player's point of view.
///
/// `Win` means the side that moved first (the side at the root of a game)
/// won, mirroring the PGN result strings `1-0`, `0-1` and `1/2-1/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Draw,
    Win,
    Loss,
}

impl GameResult {
    /// Scalar value of the result: draw 0, win 1, loss -1.
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            GameResult::Draw => 0.0,
            GameResult::Win => 1.0,
            GameResult::Loss => -1.0,
        }
    }

    /// Parse a PGN-style result string.
    pub fn from_pgn(s: &str) -> Option<Self> {
        match s.trim() {
            "1/2-1/2" => Some(GameResult::Draw),
            "1-0" => Some(GameResult::Win),
            "0-1" => Some(GameResult::Loss),
            _ => None,
        }
    }

    /// PGN-style result string.
    pub fn as_pgn(self) -> &'static str {
        match self {
            GameResult::Draw => "1/2-1/2",
            GameResult::Win => "1-0",
            GameResult::Loss => "0-1",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// Side to move at a tree node.
///
/// Every tree root is `First` (+1); each child is the negation of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    First,
    Second,
}

impl Side {
    /// Colour multiplier: +1 for `First`, -1 for `Second`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::First => 1.0,
            Side::Second => -1.0,
        }
    }

    /// The opponent.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl Neg for Side {
    type Output = Side;

    fn neg(self) -> Side {
        self.opponent()
    }
}
