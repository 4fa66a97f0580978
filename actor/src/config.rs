//! Configuration for the Actor service
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_workers() -> usize {
    CENTRAL_CONFIG.selfplay.workers
}

fn default_games_per_worker() -> u32 {
    CENTRAL_CONFIG.selfplay.games_per_worker
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.mcts.iterations
}

fn default_max_plies() -> u32 {
    CENTRAL_CONFIG.mcts.max_plies
}

fn default_c_base() -> f32 {
    CENTRAL_CONFIG.mcts.c_base
}

fn default_c_init() -> f32 {
    CENTRAL_CONFIG.mcts.c_init
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.mcts.seed
}

fn default_output() -> String {
    CENTRAL_CONFIG
        .selfplay_output()
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.selfplay.log_interval
}

#[derive(Parser, Debug, Clone)]
#[command(name = "actor")]
#[command(about = "gambit actor - MCTS self-play game generator")]
#[command(
    long_about = "Actor that plays tic-tac-toe against itself with Monte Carlo Tree Search
on several worker threads and writes one JSON line per training example.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Number of worker threads, each with its own search tree
    #[arg(long, env = "ACTOR_WORKERS", default_value_t = default_workers())]
    pub workers: usize,

    /// Games played by each worker
    #[arg(long, env = "ACTOR_GAMES_PER_WORKER", default_value_t = default_games_per_worker())]
    pub games_per_worker: u32,

    /// MCTS iterations per move
    #[arg(long, env = "ACTOR_ITERATIONS", default_value_t = default_iterations())]
    pub iterations: u32,

    /// Maximum plies per game before it is cut off
    #[arg(long, env = "ACTOR_MAX_PLIES", default_value_t = default_max_plies())]
    pub max_plies: u32,

    /// Exploration schedule denominator
    #[arg(long, default_value_t = default_c_base())]
    pub c_base: f32,

    /// Exploration schedule offset
    #[arg(long, default_value_t = default_c_init())]
    pub c_init: f32,

    /// Base RNG seed; worker i uses seed + i
    #[arg(long, env = "ACTOR_SEED", default_value_t = default_seed())]
    pub seed: u64,

    /// JSON-lines file receiving the training examples
    #[arg(long, env = "ACTOR_OUTPUT", default_value_t = default_output())]
    pub output: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ACTOR_LOG_LEVEL", default_value_t = default_log_level())]
    pub log_level: String,

    /// Log progress every N games (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow!("workers must be greater than 0"));
        }

        if self.games_per_worker == 0 {
            return Err(anyhow!("games_per_worker must be greater than 0"));
        }

        if self.iterations == 0 {
            return Err(anyhow!("iterations must be greater than 0"));
        }

        if self.output.is_empty() {
            return Err(anyhow!("output cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.mcts_config()
            .validate()
            .context("invalid MCTS settings")?;

        Ok(())
    }

    /// Search settings for the worker pool.
    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::default()
            .with_iterations(self.iterations)
            .with_max_plies(self.max_plies)
            .with_exploration(self.c_base, self.c_init)
            .with_seed(self.seed)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output)
    }

    pub fn total_games(&self) -> u64 {
        self.workers as u64 * self.games_per_worker as u64
    }
}
