//! membench CLI application
//!
//! Measures sustainable memory bandwidth with the Copy, Scale, Add and Triad
//! kernels plus optional Gather, Scatter and indirect dot product kernels.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use membench_cli::commands::config::handle_config_command;
use membench_cli::commands::info::show_system_info;
use membench_cli::commands::{ConfigAction, RunCommand};
use membench_cli::config::load_config;
use membench_cli::exit::{EXIT_GENERIC_FAIL, EXIT_SUCCESS};
use membench_cli::logging::{setup_logging, LogFormat};

/// membench - memory bandwidth benchmark
#[derive(Parser)]
#[command(name = "membench")]
#[command(about = "Sustainable memory bandwidth benchmark")]
#[command(long_about = r#"
membench measures sustainable memory bandwidth with simple vector kernels
over arrays much larger than the caches, reporting the best rate per kernel
and validating that every kernel computed the expected values.

Examples:
  # Default run: 10M doubles per array, 10 repetitions
  membench run

  # Smaller single-precision run with the indexed kernels
  membench run --array-size 2000000 --element-type f32 --all-indexed --permute --seed 7

  # Machine-readable output
  membench run --format json --output report.json

  # Inspect configuration
  membench config show
"#)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, value_name = "FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark
    #[command(alias = "bench")]
    Run(RunCommand),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system information
    Info,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.log_level.as_deref(), cli.log_format) {
        eprintln!("{e}");
    }

    let result = run(cli);

    if let Err(e) = result {
        error!("Command failed: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            error!("  Caused by: {}", err);
            source = err.source();
        }
        eprintln!("Error: {e:#}");
        std::process::exit(EXIT_GENERIC_FAIL);
    }

    std::process::exit(EXIT_SUCCESS);
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(cmd)) => {
            let config = load_config(cli.config.as_deref())?;
            cmd.execute(config)
        }
        Some(Commands::Config { action }) => handle_config_command(action, cli.config.as_deref()),
        Some(Commands::Info) => show_system_info(),
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
