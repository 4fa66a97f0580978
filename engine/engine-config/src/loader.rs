//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by GAMBIT_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("GAMBIT_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from GAMBIT_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "GAMBIT_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f32, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: GAMBIT_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "GAMBIT_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "GAMBIT_COMMON_LOG_LEVEL");

    // MCTS
    env_override!(config, mcts.iterations, "GAMBIT_MCTS_ITERATIONS", parse);
    env_override!(config, mcts.c_base, "GAMBIT_MCTS_C_BASE", parse);
    env_override!(config, mcts.c_init, "GAMBIT_MCTS_C_INIT", parse);
    env_override!(config, mcts.max_plies, "GAMBIT_MCTS_MAX_PLIES", parse);
    env_override!(config, mcts.seed, "GAMBIT_MCTS_SEED", parse);

    // Self-play
    env_override!(config, selfplay.workers, "GAMBIT_SELFPLAY_WORKERS", parse);
    env_override!(
        config,
        selfplay.games_per_worker,
        "GAMBIT_SELFPLAY_GAMES_PER_WORKER",
        parse
    );
    env_override!(config, selfplay.output, "GAMBIT_SELFPLAY_OUTPUT");
    env_override!(
        config,
        selfplay.log_interval,
        "GAMBIT_SELFPLAY_LOG_INTERVAL",
        parse
    );

    config
}
