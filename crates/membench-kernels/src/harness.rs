//! Top-level driver: configuration in, [`BenchmarkReport`] out.

use crate::calibrate::{estimate_granularity, MIN_TICKS_PER_TEST};
use crate::clock::{clock_for, Clock};
use crate::element::StreamElement;
use crate::kernels::KernelSet;
use crate::report::{BenchmarkReport, CalibrationReport, RunSummary};
use crate::runner::TrialRunner;
use crate::stats::summarize;
use crate::system::{preflight_memory, SystemInfo};
use crate::thread_pool::BenchThreadPool;
use crate::validate::validate;
use crate::workspace::{seed_from_time, Workspace, WorkspaceLayout};
use membench_common::{BenchConfig, ElementType, Result};

/// Run one benchmark with the clock named in `config`.
///
/// # Errors
///
/// Fails before any timing starts if the configuration is invalid, the
/// worker pool cannot be built, or the arrays cannot be allocated.
/// Validation failures and a coarse timer are reported, not returned.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchmarkReport> {
    let clock = clock_for(config.clock);
    run_benchmark_with_clock(config, clock.as_ref())
}

/// Like [`run_benchmark`] with an explicit clock.
pub fn run_benchmark_with_clock(config: &BenchConfig, clock: &dyn Clock) -> Result<BenchmarkReport> {
    let mut config = config.clone();
    let notes = config.normalize();
    config.validate()?;

    match config.element_type {
        ElementType::F32 => run_typed::<f32>(&config, clock, notes),
        ElementType::F64 => run_typed::<f64>(&config, clock, notes),
    }
}

fn run_typed<T: StreamElement>(
    config: &BenchConfig,
    clock: &dyn Clock,
    notes: Vec<String>,
) -> Result<BenchmarkReport> {
    let timestamp = chrono::Local::now().to_rfc3339();
    let pool = BenchThreadPool::with_threads(config.threads)?;
    let system = SystemInfo::collect(pool.num_threads());

    preflight_memory(config.footprint_bytes().unwrap_or(usize::MAX) as u64)?;

    let layout = WorkspaceLayout::from_config(config);
    tracing::info!(
        array_size = layout.array_size,
        index_array_size = layout.index_array_size,
        element = %T::ELEMENT_TYPE,
        threads = pool.num_threads(),
        "allocating workspace"
    );
    let mut workspace = pool.install(|| Workspace::<T>::allocate(layout))?;

    let permutation_seed = (config.permute_index && layout.has_index()).then(|| {
        let seed = config.seed.unwrap_or_else(seed_from_time);
        workspace.permute_index(seed);
        seed
    });

    let granularity = estimate_granularity(clock);
    let test_time_us = {
        let start = clock.now();
        pool.install(|| workspace.warm_up());
        (1.0e6 * (clock.now() - start)).max(0.0)
    };
    let calibration = CalibrationReport::new(granularity, test_time_us);
    if !calibration.timer_adequate {
        tracing::warn!(
            ticks_per_test = calibration.ticks_per_test,
            minimum = MIN_TICKS_PER_TEST,
            "each test spans few clock ticks; increase the array size"
        );
    }

    let kernels = KernelSet::new(&layout, config.element_bytes());
    let mut runner = TrialRunner::new(clock, &kernels, config.ntimes);
    let timings = runner.run(&mut workspace, &pool)?;
    let statistics = summarize(&kernels, timings);

    let ntimes = runner.ntimes();
    let validation = pool.install(|| validate(&workspace, ntimes));

    Ok(BenchmarkReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp,
        system,
        run: RunSummary::from_config(config, permutation_seed),
        calibration,
        kernels: statistics,
        validation,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use membench_common::{ConfigError, IndexedKernels, MembenchError};

    fn small(element_type: ElementType) -> BenchConfig {
        BenchConfig {
            array_size: 4096,
            index_array_size: 2048,
            element_type,
            ntimes: 3,
            threads: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_f64_run_validates() {
        let report = run_benchmark(&small(ElementType::F64)).unwrap();
        assert!(report.validation.passed);
        assert_eq!(report.kernels.len(), 4);
        assert_eq!(report.run.ntimes, 3);
        assert_eq!(report.system.worker_threads, 2);
        assert!(report.notes.is_empty());
    }

    #[test]
    fn test_f32_with_indexed_kernels() {
        let mut config = small(ElementType::F32);
        config.kernels = IndexedKernels::all();
        config.permute_index = true;
        config.seed = Some(5);
        let report = run_benchmark(&config).unwrap();
        assert!(report.validation.passed, "{:?}", report.validation);
        assert_eq!(report.kernels.len(), 7);
        assert_eq!(report.run.permutation_seed, Some(5));
        assert!(report.validation.dot.is_some());
    }

    #[test]
    fn test_f32_overflow_to_infinity_validates() {
        let mut config = small(ElementType::F32);
        config.ntimes = 40;
        let report = run_benchmark(&config).unwrap();
        assert!(report.validation.expected.a.is_infinite());
        assert!(report.validation.passed, "{:?}", report.validation);
    }

    #[test]
    fn test_ntimes_normalized_with_note() {
        let mut config = small(ElementType::F64);
        config.ntimes = 1;
        let report = run_benchmark(&config).unwrap();
        assert_eq!(report.run.ntimes, 10);
        assert_eq!(report.notes.len(), 1);
        assert!(report.validation.passed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small(ElementType::F64);
        config.array_size = 0;
        let err = run_benchmark(&config).unwrap_err();
        assert!(matches!(err, MembenchError::Config(ConfigError::Validation(_))));
    }
}
