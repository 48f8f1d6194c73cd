//! Statistics reducer: per-kernel min/avg/max over the retained samples and
//! the best-case bandwidth derived from the minimum.

use crate::kernels::{KernelKind, KernelSet};
use crate::runner::TimingMatrix;
use serde::{Deserialize, Serialize};

/// Summary of one kernel's timings. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelStatistics {
    pub kind: KernelKind,
    pub label: String,
    pub bytes: u64,
    pub avg_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    /// Decimal MB/s at the minimum time; `None` when that time is zero.
    pub best_rate_mb_s: Option<f64>,
}

/// `bytes * 1e-6 / min_time`.
pub fn best_rate_mb_s(bytes: u64, min_time: f64) -> Option<f64> {
    (min_time > 0.0).then(|| 1.0e-6 * bytes as f64 / min_time)
}

/// Reduce a timing matrix. Repetition 0 of every kernel is ignored.
///
/// Kernels whose rows hold no retained sample get zero times and no rate.
pub fn summarize(kernels: &KernelSet, timings: TimingMatrix) -> Vec<KernelStatistics> {
    kernels
        .iter()
        .enumerate()
        .take(timings.kernel_count())
        .map(|(k, kernel)| {
            let samples = timings.retained(k);
            let (min_time, avg_time, max_time) = min_avg_max(samples);
            let best_rate_mb_s = if samples.is_empty() { None } else { best_rate_mb_s(kernel.bytes, min_time) };
            KernelStatistics {
                kind: kernel.kind,
                label: kernel.label.to_string(),
                bytes: kernel.bytes,
                avg_time,
                min_time,
                max_time,
                best_rate_mb_s,
            }
        })
        .collect()
}

fn min_avg_max(samples: &[f64]) -> (f64, f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = samples.iter().sum::<f64>() / samples.len() as f64;
    // Rounding in the mean can leave it a hair outside [min, max].
    (min, avg.clamp(min, max), max)
}
