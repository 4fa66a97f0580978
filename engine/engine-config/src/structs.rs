//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_c_base() -> f32 {
    defaults::c_base()
}
fn d_c_init() -> f32 {
    defaults::c_init()
}
fn d_max_plies() -> u32 {
    defaults::max_plies()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_workers() -> usize {
    defaults::workers()
}
fn d_games_per_worker() -> u32 {
    defaults::games_per_worker()
}
fn d_output() -> String {
    defaults::output().into()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsSection,
    #[serde(default)]
    pub selfplay: SelfPlayConfig,
}

impl CentralConfig {
    /// Self-play output file. A relative `selfplay.output` lives under
    /// `common.data_dir`; an absolute one is used as is.
    pub fn selfplay_output(&self) -> PathBuf {
        Path::new(&self.common.data_dir).join(&self.selfplay.output)
    }
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Search parameters (`[mcts]`)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsSection {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_c_base")]
    pub c_base: f32,
    #[serde(default = "d_c_init")]
    pub c_init: f32,
    #[serde(default = "d_max_plies")]
    pub max_plies: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for MctsSection {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            c_base: defaults::c_base(),
            c_init: defaults::c_init(),
            max_plies: defaults::max_plies(),
            seed: defaults::seed(),
        }
    }
}

/// Self-play worker pool (`[selfplay]`)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelfPlayConfig {
    #[serde(default = "d_workers")]
    pub workers: usize,
    #[serde(default = "d_games_per_worker")]
    pub games_per_worker: u32,
    #[serde(default = "d_output")]
    pub output: String,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            workers: defaults::workers(),
            games_per_worker: defaults::games_per_worker(),
            output: defaults::output().into(),
            log_interval: defaults::log_interval(),
        }
    }
}
