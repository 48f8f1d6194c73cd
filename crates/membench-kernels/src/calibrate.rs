//! Clock granularity estimation.
//!
//! Reads the clock until it reports a new value at least one microsecond
//! after the previous distinct reading, records [`CALIBRATION_SAMPLES`] such
//! readings, and takes the smallest gap between consecutive ones as the
//! timer granularity. The estimate is diagnostic: it tells the user whether
//! a kernel lasts long enough (at least [`MIN_TICKS_PER_TEST`] ticks) to be
//! timed reliably, and never gates the run.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};

/// Distinct clock readings collected per estimate.
pub const CALIBRATION_SAMPLES: usize = 20;

/// Ticks a single kernel execution should span for trustworthy timing.
pub const MIN_TICKS_PER_TEST: f64 = 20.0;

/// Upper bound on busy-wait iterations while waiting for one tick.
const DEFAULT_MAX_SPINS: u64 = 50_000_000;

/// Result of a granularity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityEstimate {
    /// Minimum non-negative gap between consecutive readings, in whole microseconds.
    pub micros: i64,
    /// The clock never advanced within the spin budget.
    pub stalled: bool,
}

impl GranularityEstimate {
    /// The clock resolves intervals below one microsecond.
    pub fn is_sub_microsecond(&self) -> bool {
        self.micros < 1
    }

    /// Granularity used for ratios; sub-microsecond clocks count as 1.
    pub fn effective_micros(&self) -> u64 {
        self.micros.max(1) as u64
    }

    /// How many ticks an interval of `duration_micros` spans.
    pub fn ticks_in(&self, duration_micros: f64) -> f64 {
        duration_micros / self.effective_micros() as f64
    }
}

/// Granularity estimator with a configurable sample count and spin budget.
#[derive(Debug, Clone, Copy)]
pub struct Calibrator {
    samples: usize,
    max_spins: u64,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self { samples: CALIBRATION_SAMPLES, max_spins: DEFAULT_MAX_SPINS }
    }
}

impl Calibrator {
    pub fn new(samples: usize, max_spins: u64) -> Self {
        Self { samples: samples.max(2), max_spins: max_spins.max(1) }
    }

    /// Estimate the granularity of `clock`.
    pub fn estimate<C: Clock + ?Sized>(&self, clock: &C) -> GranularityEstimate {
        let mut found = Vec::with_capacity(self.samples);
        let mut stalled = false;
        let mut t1 = clock.now();

        'collect: for _ in 0..self.samples {
            let mut spins = 0u64;
            let t2 = loop {
                let t2 = clock.now();
                if t2 - t1 >= 1.0e-6 {
                    break t2;
                }
                spins += 1;
                if spins >= self.max_spins {
                    stalled = true;
                    break 'collect;
                }
            };
            found.push(t2);
            t1 = t2;
        }

        if stalled {
            tracing::warn!(
                samples = found.len(),
                "clock did not advance during calibration; timings are unreliable"
            );
        }

        let micros = min_delta_micros(&found);
        tracing::debug!(micros, samples = found.len(), "estimated clock granularity");
        GranularityEstimate { micros, stalled }
    }
}

/// Estimate the granularity of `clock` with the default sample count.
pub fn estimate_granularity<C: Clock + ?Sized>(clock: &C) -> GranularityEstimate {
    Calibrator::default().estimate(clock)
}

/// Smallest gap between consecutive readings, clamped at zero.
fn min_delta_micros(readings: &[f64]) -> i64 {
    readings
        .windows(2)
        .map(|w| ((1.0e6 * (w[1] - w[0])) as i64).max(0))
        .fold(1_000_000, i64::min)
}
