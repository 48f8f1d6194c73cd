//! `membench config`: inspect configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use membench_common::{BenchConfig, DEFAULT_CONFIG_FILE};
use std::path::Path;

use crate::config::{load_config, resolve_config_path};

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the effective configuration (file plus environment) as TOML
    Show,
    /// Show the configuration file path
    Path,
    /// Print the default configuration as TOML
    Default,
}

/// Handle configuration commands
pub fn handle_config_command(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(explicit)?;
            let toml = config.to_toml().context("Failed to serialize configuration")?;
            print!("{toml}");
        }
        ConfigAction::Path => match resolve_config_path(explicit) {
            Some(path) => println!("{}", path.display()),
            None => println!("{DEFAULT_CONFIG_FILE} (not present, using defaults)"),
        },
        ConfigAction::Default => {
            let toml = BenchConfig::default_toml().context("Failed to serialize configuration")?;
            print!("{toml}");
        }
    }
    Ok(())
}
