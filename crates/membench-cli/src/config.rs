//! Config file resolution for the CLI.
//!
//! Precedence, lowest first: defaults, `membench.toml` (or `--config`),
//! `MEMBENCH_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use membench_common::{BenchConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

/// The file a run will read, if any: `--config`, else `./membench.toml`
/// when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    })
}

/// Load the effective configuration before command-line flags are applied.
pub fn load_config(explicit: Option<&Path>) -> Result<BenchConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            BenchConfig::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            tracing::debug!("no configuration file, using defaults");
            BenchConfig::from_env().context("Invalid MEMBENCH_* environment override")
        }
    }
}
