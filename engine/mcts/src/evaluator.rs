//! Evaluator traits for position evaluation.
//!
//! The evaluator maps an encoded position to a scalar value and a raw policy
//! vector. In self-play this is a neural network; for testing we provide
//! uniform and fixed-output evaluators.
//!
//! Inference backends are often not safe to call from several threads at
//! once. Such backends implement [`Model`] and are shared between search
//! workers through [`SharedEvaluator`], which holds a lock only for the
//! duration of a single inference call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Malformed evaluator output: expected {expected} policy entries, got {actual}")]
    MalformedOutput { expected: usize, actual: usize },

    #[error("Evaluator lock poisoned by a panicking worker")]
    LockPoisoned,
}

/// Result of evaluating a position.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    /// Value estimate from the perspective of the side to move.
    pub value: f32,

    /// Raw policy scores over the full move encoding (`POLICY_SIZE`
    /// entries). Not required to be normalized.
    pub policy: Vec<f32>,
}

/// Thread-safe position evaluator shared by reference between workers.
pub trait Evaluator: Send + Sync {
    /// Evaluate a single encoded position.
    fn evaluate(&self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError>;

    /// Length of the policy vectors this evaluator produces.
    fn policy_size(&self) -> usize;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        (**self).evaluate(encoded)
    }

    fn policy_size(&self) -> usize {
        (**self).policy_size()
    }
}

/// Inference backend that needs exclusive access while predicting.
pub trait Model: Send {
    fn predict(&mut self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError>;

    fn policy_size(&self) -> usize;
}

/// Shares one [`Model`] between worker threads behind a mutex.
///
/// The lock is taken for exactly one `predict` call. Tree traversal in the
/// workers never holds it.
#[derive(Debug)]
pub struct SharedEvaluator<M> {
    model: Mutex<M>,
    policy_size: usize,
    /// Number of inferences performed (for diagnostics)
    inference_count: AtomicU64,
}

impl<M: Model> SharedEvaluator<M> {
    pub fn new(model: M) -> Self {
        let policy_size = model.policy_size();
        Self {
            model: Mutex::new(model),
            policy_size,
            inference_count: AtomicU64::new(0),
        }
    }

    /// Total inferences run through this evaluator.
    pub fn inference_count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    /// Recover the wrapped model.
    pub fn into_inner(self) -> Result<M, EvaluatorError> {
        self.model
            .into_inner()
            .map_err(|_| EvaluatorError::LockPoisoned)
    }
}

impl<M: Model> Evaluator for SharedEvaluator<M> {
    fn evaluate(&self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        let result = {
            let mut model = self
                .model
                .lock()
                .map_err(|_| EvaluatorError::LockPoisoned)?;
            model.predict(encoded)
        };
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        result
    }

    fn policy_size(&self) -> usize {
        self.policy_size
    }
}

/// Uniform evaluator: equal score for every policy entry, value 0.0.
/// Useful for running search without a trained model.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    policy_size: usize,
}

impl UniformEvaluator {
    pub fn new(policy_size: usize) -> Self {
        Self { policy_size }
    }

    fn output(&self) -> EvalResult {
        let prob = if self.policy_size == 0 {
            0.0
        } else {
            1.0 / self.policy_size as f32
        };
        EvalResult {
            value: 0.0,
            policy: vec![prob; self.policy_size],
        }
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        Ok(self.output())
    }

    fn policy_size(&self) -> usize {
        self.policy_size
    }
}

impl Model for UniformEvaluator {
    fn predict(&mut self, _encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        Ok(self.output())
    }

    fn policy_size(&self) -> usize {
        self.policy_size
    }
}

/// Returns the same value and policy for every position.
#[derive(Debug, Clone)]
pub struct FixedEvaluator {
    pub value: f32,
    pub policy: Vec<f32>,
}

impl FixedEvaluator {
    pub fn new(value: f32, policy: Vec<f32>) -> Self {
        Self { value, policy }
    }
}

impl Evaluator for FixedEvaluator {
    fn evaluate(&self, _encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        Ok(EvalResult {
            value: self.value,
            policy: self.policy.clone(),
        })
    }

    fn policy_size(&self) -> usize {
        self.policy.len()
    }
}

impl Model for FixedEvaluator {
    fn predict(&mut self, encoded: &[f32]) -> Result<EvalResult, EvaluatorError> {
        <Self as Evaluator>::evaluate(self, encoded)
    }

    fn policy_size(&self) -> usize {
        self.policy.len()
    }
}
