//! MCTS configuration parameters.

use thiserror::Error;

/// Errors reported by [`MctsConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("c_base must be a positive finite number, got {0}")]
    InvalidBase(f32),

    #[error("c_init must be a finite number, got {0}")]
    InvalidInit(f32),

    #[error("max_plies must be at least 1")]
    ZeroPlyLimit,
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of iterations run by each `search` call issued by the
    /// self-play driver (one call per ply).
    pub iterations: u32,

    /// Denominator of the exploration growth term.
    /// c(N) = ln((N + c_base + 1) / c_base) + c_init
    pub c_base: f32,

    /// Constant offset of the exploration rate.
    pub c_init: f32,

    /// Hard cap on the number of plies in a self-play game. Guarantees
    /// termination when the game never reaches a natural end.
    pub max_plies: u32,

    /// Seed for the engine RNG used to sample the returned child.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            c_base: 19652.0,
            c_init: 1.0,
            max_plies: 300,
            seed: 0,
        }
    }
}

impl MctsConfig {
    /// Small, fast config for tests.
    pub fn for_testing() -> Self {
        Self {
            iterations: 50,
            max_plies: 20,
            seed: 42,
            ..Self::default()
        }
    }

    /// Builder pattern: set iterations per search.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder pattern: set the ply cap.
    pub fn with_max_plies(mut self, plies: u32) -> Self {
        self.max_plies = plies;
        self
    }

    /// Builder pattern: set the exploration constants.
    pub fn with_exploration(mut self, c_base: f32, c_init: f32) -> Self {
        self.c_base = c_base;
        self.c_init = c_init;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.c_base.is_finite() || self.c_base <= 0.0 {
            return Err(ConfigError::InvalidBase(self.c_base));
        }
        if !self.c_init.is_finite() {
            return Err(ConfigError::InvalidInit(self.c_init));
        }
        if self.max_plies == 0 {
            return Err(ConfigError::ZeroPlyLimit);
        }
        Ok(())
    }
}
