//! Clock abstraction.
//!
//! A [`Clock`] returns elapsed time in fractional seconds. The monotonic
//! implementation is the default; the wall clock is a fallback that is
//! subject to calendar adjustments.

use membench_common::ClockSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of timestamps for calibration and kernel timing.
pub trait Clock: Send + Sync {
    /// Current reading in seconds. Only differences between readings matter.
    fn now(&self) -> f64;

    /// Which time source backs this clock.
    fn source(&self) -> ClockSource;
}

/// Monotonic clock measured from its construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn source(&self) -> ClockSource {
        ClockSource::Monotonic
    }
}

/// Calendar clock (seconds since the Unix epoch).
///
/// A failed read yields `0.0`; the resulting jump shows up as a suspicious
/// calibration or a zero-length sample rather than aborting the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline]
    fn now(&self) -> f64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0.0, |d| d.as_secs_f64())
    }

    fn source(&self) -> ClockSource {
        ClockSource::Wall
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// Reading `n` returns `n * step`, so differences between readings are
/// reproducible. Used to exercise the calibrator and the trial runner
/// without depending on the host timer.
#[derive(Debug)]
pub struct StepClock {
    step: f64,
    reads: AtomicU64,
}

impl StepClock {
    pub fn new(step: f64) -> Self {
        Self { step, reads: AtomicU64::new(0) }
    }

    /// Number of readings taken so far.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Clock for StepClock {
    fn now(&self) -> f64 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        n as f64 * self.step
    }

    fn source(&self) -> ClockSource {
        ClockSource::Monotonic
    }
}

/// Construct the clock selected by configuration.
pub fn clock_for(source: ClockSource) -> Box<dyn Clock> {
    match source {
        ClockSource::Monotonic => Box::new(MonotonicClock::new()),
        ClockSource::Wall => Box::new(WallClock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..10_000 {
            let t = clock.now();
            assert!(t >= last, "clock went backwards: {t} < {last}");
            last = t;
        }
    }

    #[test]
    fn test_wall_clock_is_after_epoch() {
        assert!(WallClock.now() > 0.0);
    }

    #[test]
    fn test_step_clock_advances_by_step() {
        let clock = StepClock::new(0.5);
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.now(), 1.0);
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn test_clock_for_source() {
        assert_eq!(clock_for(ClockSource::Monotonic).source(), ClockSource::Monotonic);
        assert_eq!(clock_for(ClockSource::Wall).source(), ClockSource::Wall);
    }
}
