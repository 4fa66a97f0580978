//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so every binary agrees
//! on the same defaults.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    selfplay: SelfPlayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    iterations: u32,
    c_base: f32,
    c_init: f32,
    max_plies: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct SelfPlayDefaults {
    workers: usize,
    games_per_worker: u32,
    output: String,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn iterations() -> u32 {
    DEFAULTS.mcts.iterations
}
pub fn c_base() -> f32 {
    DEFAULTS.mcts.c_base
}
pub fn c_init() -> f32 {
    DEFAULTS.mcts.c_init
}
pub fn max_plies() -> u32 {
    DEFAULTS.mcts.max_plies
}
pub fn seed() -> u64 {
    DEFAULTS.mcts.seed
}

// Self-play
pub fn workers() -> usize {
    DEFAULTS.selfplay.workers
}
pub fn games_per_worker() -> u32 {
    DEFAULTS.selfplay.games_per_worker
}
pub fn output() -> &'static str {
    &DEFAULTS.selfplay.output
}
pub fn log_interval() -> u32 {
    DEFAULTS.selfplay.log_interval
}
