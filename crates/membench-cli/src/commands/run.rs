//! `membench run`: execute the benchmark and render the report.

use anyhow::{Context, Result};
use clap::Args;
use membench_common::{BenchConfig, ClockSource, ElementType, IndexedKernels};
use membench_kernels::{run_benchmark, BenchmarkReport};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::output::{write_report, OutputFormat};

/// Run command arguments. Every option overrides the config file and environment.
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Live elements per primary array
    #[arg(short = 'n', long, value_name = "N")]
    pub array_size: Option<usize>,

    /// Elements in the index array used by the indexed kernels
    #[arg(long, value_name = "N")]
    pub index_array_size: Option<usize>,

    /// Padding elements before each array
    #[arg(long, value_name = "N")]
    pub offset: Option<usize>,

    /// Element precision (f32, f64)
    #[arg(short = 't', long, value_name = "TYPE")]
    pub element_type: Option<ElementType>,

    /// Repetitions per kernel; the first is discarded
    #[arg(long, value_name = "N")]
    pub ntimes: Option<usize>,

    /// Enable the Gather kernel
    #[arg(long)]
    pub gather: bool,

    /// Enable the Scatter kernel
    #[arg(long)]
    pub scatter: bool,

    /// Enable the indirect dot product kernel
    #[arg(long)]
    pub indirect_dot: bool,

    /// Enable all indexed kernels
    #[arg(long)]
    pub all_indexed: bool,

    /// Randomly permute the index array
    #[arg(long)]
    pub permute: bool,

    /// Seed for the index permutation (default: current time)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Worker threads (default: all CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Clock source (monotonic, wall)
    #[arg(long, value_name = "CLOCK")]
    pub clock: Option<ClockSource>,

    /// Output format (text, json, csv)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file for results
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RunCommand {
    /// Layer the command-line options over `config`.
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(v) = self.array_size {
            config.array_size = v;
        }
        if let Some(v) = self.index_array_size {
            config.index_array_size = v;
        }
        if let Some(v) = self.offset {
            config.offset = v;
        }
        if let Some(v) = self.element_type {
            config.element_type = v;
        }
        if let Some(v) = self.ntimes {
            config.ntimes = v;
        }
        if self.all_indexed {
            config.kernels = IndexedKernels::all();
        }
        config.kernels.gather |= self.gather;
        config.kernels.scatter |= self.scatter;
        config.kernels.indirect_dot |= self.indirect_dot;
        config.permute_index |= self.permute;
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if let Some(v) = self.clock {
            config.clock = v;
        }
    }

    /// Execute the run command.
    pub fn execute(&self, base: BenchConfig) -> Result<()> {
        let mut config = base;
        self.apply(&mut config);
        config.validate().context("Invalid benchmark configuration")?;

        info!(
            array_size = config.array_size,
            element_type = %config.element_type,
            ntimes = config.ntimes,
            "starting benchmark"
        );
        let report = run_benchmark(&config).context("Benchmark run failed")?;
        self.finish(&report)
    }

    /// Render a completed run. A run that failed validation is still
    /// reported and is not an error.
    pub fn finish(&self, report: &BenchmarkReport) -> Result<()> {
        if !report.validation.passed {
            warn!(failed = ?report.validation.failures(), "results did not validate");
        }
        self.output_results(report)
    }

    fn output_results(&self, report: &BenchmarkReport) -> Result<()> {
        let (mut output, color): (Box<dyn Write>, bool) = if let Some(path) = &self.output {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(std::io::BufWriter::new(file)), false)
        } else {
            (Box::new(std::io::stdout()), console::colors_enabled())
        };
        write_report(report, self.format, output.as_mut(), color)
    }
}
