//! Stub games and evaluators shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use engine_core::{GameResult, GameState};

use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};

/// Two moves at every ply until `remaining` reaches zero, then a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    pub remaining: u32,
}

impl Countdown {
    pub fn new(remaining: u32) -> Self {
        Self { remaining }
    }
}

impl GameState for Countdown {
    type Move = u8;
    const POLICY_SIZE: usize = 2;

    fn legal_moves(&self) -> Vec<u8> {
        if self.remaining == 0 {
            Vec::new()
        } else {
            vec![0, 1]
        }
    }

    fn is_game_over(&self) -> bool {
        self.remaining == 0
    }

    fn result(&self) -> GameResult {
        GameResult::Draw
    }

    fn apply(&self, _mv: &u8) -> Self {
        Self {
            remaining: self.remaining - 1,
        }
    }

    fn encode(&self) -> Vec<f32> {
        vec![self.remaining as f32]
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

/// A position that is already over.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished(pub GameResult);

impl GameState for Finished {
    type Move = u8;
    const POLICY_SIZE: usize = 2;

    fn legal_moves(&self) -> Vec<u8> {
        Vec::new()
    }

    fn is_game_over(&self) -> bool {
        true
    }

    fn result(&self) -> GameResult {
        self.0
    }

    fn apply(&self, _mv: &u8) -> Self {
        self.clone()
    }

    fn encode(&self) -> Vec<f32> {
        vec![0.0]
    }

    fn decode_policy(&self, _policy: &[f32]) -> Vec<f32> {
        Vec::new()
    }

    fn encode_policy(&self, _probs: &[f32]) -> Vec<f32> {
        vec![0.0; Self::POLICY_SIZE]
    }
}

/// Breaks the terminal contract: not over, yet no legal moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Stuck;

impl GameState for Stuck {
    type Move = u8;
    const POLICY_SIZE: usize = 2;

    fn legal_moves(&self) -> Vec<u8> {
        Vec::new()
    }

    fn is_game_over(&self) -> bool {
        false
    }

    fn result(&self) -> GameResult {
        GameResult::Draw
    }

    fn apply(&self, _mv: &u8) -> Self {
        Stuck
    }

    fn encode(&self) -> Vec<f32> {
        vec![0.0]
    }

    fn decode_policy(&self, _policy: &[f32]) -> Vec<f32> {
        Vec::new()
    }

    fn encode_policy(&self, _probs: &[f32]) -> Vec<f32> {
        vec![0.0; Self::POLICY_SIZE]
    }
}

/// Two legal moves, but the decoder keeps only the first policy entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortDecode;

impl GameState for ShortDecode {
    type Move = u8;
    const POLICY_SIZE: usize = 2;

    fn legal_moves(&self) -> Vec<u8> {
        vec![0, 1]
    }

    fn is_game_over(&self) -> bool {
        false
    }

    fn result(&self) -> GameResult {
        GameResult::Draw
    }

    fn apply(&self, _mv: &u8) -> Self {
        ShortDecode
    }

    fn encode(&self) -> Vec<f32> {
        vec![0.0]
    }

    fn decode_policy(&self, policy: &[f32]) -> Vec<f32> {
        policy[..1].to_vec()
    }

    fn encode_policy(&self, _probs: &[f32]) -> Vec<f32> {
        vec![0.0; Self::POLICY_SIZE]
    }
}

/// Wraps an evaluator and counts calls.
#[derive(Debug)]
pub struct Counting<E> {
    pub inner: E,
    pub calls: AtomicUsize,
}

impl<E> Counting<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<E: Evaluator> Evaluator for Counting<E> {
    fn evaluate(&self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(encoded)
    }

    fn policy_size(&self) -> usize {
        self.inner.policy_size()
    }
}

/// Fails on its first call, then delegates.
#[derive(Debug)]
pub struct FailsOnce<E> {
    pub inner: E,
    pub failed: AtomicBool,
}

impl<E> FailsOnce<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            failed: AtomicBool::new(false),
        }
    }
}

impl<E: Evaluator> Evaluator for FailsOnce<E> {
    fn evaluate(&self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(EvaluatorError::EvaluationFailed("transient failure".into()));
        }
        self.inner.evaluate(encoded)
    }

    fn policy_size(&self) -> usize {
        self.inner.policy_size()
    }
}

/// Always fails.
#[derive(Debug, Default)]
pub struct Broken;

impl Evaluator for Broken {
    fn evaluate(&self, _encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        Err(EvaluatorError::EvaluationFailed("model offline".into()))
    }

    fn policy_size(&self) -> usize {
        2
    }
}
