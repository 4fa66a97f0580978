//! TicTacToe for the gambit engine
//!
//! A small, fully solved game used to exercise the search and self-play
//! pipeline end to end.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{GameResult, GameState};
//! use games_tictactoe::Board;
//!
//! let board = Board::new().apply(&4).apply(&0);
//! assert_eq!(board.legal_moves().len(), 7);
//! assert!(!board.is_game_over());
//! assert_eq!(board.result(), GameResult::Draw);
//! ```

use engine_core::{GameResult, GameState, Side};

/// Winning positions (rows, columns, diagonals)
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

const EMPTY: u8 = 0;
const X: u8 = 1;
const O: u8 = 2;
const DRAW: u8 = 3;

/// TicTacToe position
///
/// Represents the complete state of a game: the board, the player to move
/// and the winner, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Board representation: 0=empty, 1=X, 2=O
    cells: [u8; 9],
    /// Player to move: 1=X, 2=O
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=X, 2=O, 3=draw
    winner: u8,
}

impl Board {
    /// Empty board, X to move.
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; 9],
            current_player: X,
            winner: EMPTY,
        }
    }

    /// Build a position from a sequence of squares, X first.
    ///
    /// Panics if a move is illegal.
    pub fn from_moves(moves: &[u8]) -> Self {
        moves.iter().fold(Self::new(), |board, mv| board.apply(mv))
    }

    /// Cell contents: 0=empty, 1=X, 2=O
    pub fn cells(&self) -> &[u8; 9] {
        &self.cells
    }

    /// Side to move. X is [`Side::First`].
    pub fn side_to_move(&self) -> Side {
        if self.current_player == X {
            Side::First
        } else {
            Side::Second
        }
    }

    /// Bit-mask of legal squares.
    ///
    /// Bits 0-8 correspond to board positions 0-8. The mask is zero once
    /// the game is over.
    pub fn legal_moves_mask(&self) -> u16 {
        if self.winner != EMPTY {
            return 0;
        }

        self.cells
            .iter()
            .enumerate()
            .fold(0u16, |mask, (idx, cell)| {
                if *cell == EMPTY {
                    mask | (1u16 << idx)
                } else {
                    mask
                }
            })
    }

    fn check_winner(cells: &[u8; 9]) -> u8 {
        for line in &LINES {
            let [a, b, c] = *line;
            if cells[a] != EMPTY && cells[a] == cells[b] && cells[b] == cells[c] {
                return cells[a];
            }
        }

        if cells.iter().all(|&cell| cell != EMPTY) {
            return DRAW;
        }

        EMPTY
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for Board {
    type Move = u8;
    const POLICY_SIZE: usize = 9;

    fn legal_moves(&self) -> Vec<u8> {
        if self.winner != EMPTY {
            return Vec::new();
        }

        (0..9u8)
            .filter(|&pos| self.cells[pos as usize] == EMPTY)
            .collect()
    }

    fn is_game_over(&self) -> bool {
        self.winner != EMPTY
    }

    /// `Win` when X completed a line, `Loss` when O did.
    fn result(&self) -> GameResult {
        match self.winner {
            X => GameResult::Win,
            O => GameResult::Loss,
            _ => GameResult::Draw,
        }
    }

    fn apply(&self, mv: &u8) -> Self {
        let pos = *mv as usize;
        assert!(
            self.winner == EMPTY && pos < 9 && self.cells[pos] == EMPTY,
            "illegal move {mv} on {:?}",
            self.cells
        );

        let mut next = *self;
        next.cells[pos] = self.current_player;
        next.winner = Self::check_winner(&next.cells);
        if next.winner == EMPTY {
            next.current_player = if self.current_player == X { O } else { X };
        }
        next
    }

    /// 27 floats: X plane, O plane, side-to-move plane (1.0 when X moves).
    fn encode(&self) -> Vec<f32> {
        let mut planes = vec![0.0; 27];
        for (i, &cell) in self.cells.iter().enumerate() {
            match cell {
                X => planes[i] = 1.0,
                O => planes[9 + i] = 1.0,
                _ => {}
            }
        }
        if self.current_player == X {
            planes[18..].fill(1.0);
        }
        planes
    }

    fn decode_policy(&self, policy: &[f32]) -> Vec<f32> {
        self.legal_moves()
            .iter()
            .map(|&m| policy[m as usize])
            .collect()
    }

    fn encode_policy(&self, probs: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; Self::POLICY_SIZE];
        for (&m, &p) in self.legal_moves().iter().zip(probs) {
            out[m as usize] = p;
        }
        out
    }
}
