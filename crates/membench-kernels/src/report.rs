//! Serializable record of one benchmark run.

use crate::calibrate::{GranularityEstimate, MIN_TICKS_PER_TEST};
use crate::stats::KernelStatistics;
use crate::system::SystemInfo;
use crate::validate::ValidationReport;
use membench_common::{BenchConfig, ClockSource, ElementType, INDEX_BYTES, SCALAR};
use serde::{Deserialize, Serialize};

const MIB: f64 = 1024.0 * 1024.0;

/// Everything a renderer needs to print a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub version: String,
    /// RFC 3339 start time.
    pub timestamp: String,
    pub system: SystemInfo,
    pub run: RunSummary,
    pub calibration: CalibrationReport,
    pub kernels: Vec<KernelStatistics>,
    pub validation: ValidationReport,
    /// Informational messages, e.g. adjusted settings.
    pub notes: Vec<String>,
}

impl BenchmarkReport {
    pub fn kernel(&self, label: &str) -> Option<&KernelStatistics> {
        self.kernels.iter().find(|k| k.label == label)
    }
}

/// Sizes and settings the run actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub array_size: usize,
    pub index_array_size: usize,
    pub offset: usize,
    pub element_type: ElementType,
    pub element_bytes: usize,
    pub index_bytes: usize,
    pub array_mib: f64,
    pub total_mib: f64,
    pub ntimes: usize,
    pub scalar: f64,
    pub clock: ClockSource,
    pub indexed_kernels: bool,
    /// Seed of the index permutation, when one was applied.
    pub permutation_seed: Option<u64>,
}

impl RunSummary {
    pub fn from_config(config: &BenchConfig, permutation_seed: Option<u64>) -> Self {
        let array_bytes = config.array_bytes().unwrap_or(usize::MAX);
        let total_bytes = config.footprint_bytes().unwrap_or(usize::MAX);
        Self {
            array_size: config.array_size,
            index_array_size: if config.kernels.any() { config.index_array_size } else { 0 },
            offset: config.offset,
            element_type: config.element_type,
            element_bytes: config.element_bytes(),
            index_bytes: INDEX_BYTES,
            array_mib: array_bytes as f64 / MIB,
            total_mib: total_bytes as f64 / MIB,
            ntimes: config.ntimes,
            scalar: SCALAR,
            clock: config.clock,
            indexed_kernels: config.kernels.any(),
            permutation_seed,
        }
    }

    pub fn total_gib(&self) -> f64 {
        self.total_mib / 1024.0
    }
}

/// Clock granularity and the duration of the untimed warm-up pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Minimum observed tick in whole microseconds.
    pub granularity_us: i64,
    pub sub_microsecond: bool,
    /// The clock did not advance within the spin limit.
    pub stalled: bool,
    pub test_time_us: f64,
    pub ticks_per_test: f64,
    /// At least [`MIN_TICKS_PER_TEST`] ticks per test.
    pub timer_adequate: bool,
}

impl CalibrationReport {
    pub fn new(granularity: GranularityEstimate, test_time_us: f64) -> Self {
        let ticks_per_test = granularity.ticks_in(test_time_us);
        Self {
            granularity_us: granularity.micros,
            sub_microsecond: granularity.is_sub_microsecond(),
            stalled: granularity.stalled,
            test_time_us,
            ticks_per_test,
            timer_adequate: !granularity.stalled && ticks_per_test >= MIN_TICKS_PER_TEST,
        }
    }
}
