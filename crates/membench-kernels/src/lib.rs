//! Memory bandwidth benchmark core.
//!
//! A run allocates a [`Workspace`], calibrates the [`Clock`], executes the
//! [`KernelSet`] repeatedly through a [`TrialRunner`], reduces the timings
//! with [`summarize`] and checks the arrays with [`validate`]. The
//! [`run_benchmark`] driver does all of that and returns a
//! [`BenchmarkReport`].

pub mod calibrate;
pub mod clock;
pub mod element;
pub mod harness;
pub mod kernels;
pub mod report;
pub mod runner;
pub mod stats;
pub mod system;
pub mod thread_pool;
pub mod validate;
pub mod workspace;

pub use calibrate::{estimate_granularity, Calibrator, GranularityEstimate};
pub use clock::{clock_for, Clock, MonotonicClock, StepClock, WallClock};
pub use element::StreamElement;
pub use harness::{run_benchmark, run_benchmark_with_clock};
pub use kernels::{KernelDescriptor, KernelKind, KernelSet};
pub use report::{BenchmarkReport, CalibrationReport, RunSummary};
pub use runner::{RunnerState, TimingMatrix, TrialRunner};
pub use stats::{best_rate_mb_s, summarize, KernelStatistics};
pub use system::SystemInfo;
pub use thread_pool::{BenchThreadPool, ThreadPoolConfig};
pub use validate::{validate, ArrayCheck, DotCheck, ExpectedValues, ValidationReport};
pub use workspace::{fisher_yates, Workspace, WorkspaceLayout};
