//! Trial runner: executes every kernel once per repetition and times each
//! execution individually.

use crate::clock::Clock;
use crate::element::StreamElement;
use crate::kernels::KernelSet;
use crate::thread_pool::BenchThreadPool;
use crate::workspace::Workspace;
use membench_common::{MembenchError, Result, DEFAULT_NTIMES};
use serde::{Deserialize, Serialize};

/// Lifecycle of a [`TrialRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Done,
}

impl RunnerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

/// Elapsed seconds indexed by (kernel, repetition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingMatrix {
    rows: Vec<Vec<f64>>,
    ntimes: usize,
}

impl TimingMatrix {
    fn zeroed(kernels: usize, ntimes: usize) -> Self {
        Self { rows: vec![vec![0.0; ntimes]; kernels], ntimes }
    }

    /// Build a matrix from recorded rows, one per kernel.
    ///
    /// Returns `None` if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let ntimes = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ntimes) {
            return None;
        }
        Some(Self { rows, ntimes })
    }

    pub fn kernel_count(&self) -> usize {
        self.rows.len()
    }

    pub fn ntimes(&self) -> usize {
        self.ntimes
    }

    /// Every sample of kernel `k`, warm-up included.
    pub fn row(&self, k: usize) -> &[f64] {
        &self.rows[k]
    }

    /// Samples of kernel `k` with repetition 0 dropped.
    pub fn retained(&self, k: usize) -> &[f64] {
        self.rows[k].get(1..).unwrap_or(&[])
    }
}

/// Runs the kernel set `ntimes` times over a workspace.
pub struct TrialRunner<'a, C: Clock + ?Sized> {
    clock: &'a C,
    kernels: &'a KernelSet,
    ntimes: usize,
    state: RunnerState,
}

impl<'a, C: Clock + ?Sized> TrialRunner<'a, C> {
    /// `ntimes` below 2 is raised to [`DEFAULT_NTIMES`].
    pub fn new(clock: &'a C, kernels: &'a KernelSet, ntimes: usize) -> Self {
        let ntimes = if ntimes < 2 {
            tracing::info!(requested = ntimes, ntimes = DEFAULT_NTIMES, "repetition count raised");
            DEFAULT_NTIMES
        } else {
            ntimes
        };
        Self { clock, kernels, ntimes, state: RunnerState::Idle }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn ntimes(&self) -> usize {
        self.ntimes
    }

    /// Execute all repetitions on `pool` and return the recorded timings.
    ///
    /// # Errors
    ///
    /// Returns [`MembenchError::RunnerState`] if the runner has already run.
    pub fn run<T: StreamElement>(
        &mut self,
        workspace: &mut Workspace<T>,
        pool: &BenchThreadPool,
    ) -> Result<TimingMatrix> {
        if self.state != RunnerState::Idle {
            return Err(MembenchError::RunnerState {
                expected: RunnerState::Idle.as_str(),
                actual: self.state.as_str(),
            });
        }
        self.state = RunnerState::Running;
        tracing::info!(kernels = self.kernels.len(), ntimes = self.ntimes, "timed trials started");

        let (clock, kernels, ntimes) = (self.clock, self.kernels, self.ntimes);
        let timings = pool.install(|| {
            let mut timings = TimingMatrix::zeroed(kernels.len(), ntimes);
            for rep in 0..ntimes {
                for (k, kernel) in kernels.iter().enumerate() {
                    let start = clock.now();
                    kernel.kind.execute(workspace);
                    let elapsed = clock.now() - start;
                    timings.rows[k][rep] = if elapsed < 0.0 {
                        tracing::debug!(kernel = kernel.label, rep, elapsed, "negative interval clamped");
                        0.0
                    } else {
                        elapsed
                    };
                }
                tracing::debug!(rep, "repetition complete");
            }
            timings
        });

        self.state = RunnerState::Done;
        tracing::info!("timed trials finished");
        Ok(timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::StepClock;
    use crate::workspace::WorkspaceLayout;

    fn fixture() -> (Workspace<f64>, KernelSet, BenchThreadPool) {
        let layout = WorkspaceLayout::primary(256, 0);
        let ws = Workspace::allocate(layout).unwrap();
        let set = KernelSet::new(&layout, 8);
        let pool = BenchThreadPool::with_threads(Some(2)).unwrap();
        (ws, set, pool)
    }

    #[test]
    fn test_each_kernel_timed_separately() {
        let (mut ws, set, pool) = fixture();
        let clock = StepClock::new(0.5);
        let mut runner = TrialRunner::new(&clock, &set, 3);
        let timings = runner.run(&mut ws, &pool).unwrap();

        assert_eq!(runner.state(), RunnerState::Done);
        assert_eq!(timings.kernel_count(), 4);
        assert_eq!(timings.ntimes(), 3);
        // Two reads per kernel execution.
        assert_eq!(clock.reads(), 4 * 3 * 2);
        for k in 0..4 {
            assert!(timings.row(k).iter().all(|&t| t == 0.5));
        }
    }

    #[test]
    fn test_low_ntimes_raised_to_default() {
        let (_, set, _) = fixture();
        let clock = StepClock::new(1.0);
        assert_eq!(TrialRunner::new(&clock, &set, 0).ntimes(), DEFAULT_NTIMES);
        assert_eq!(TrialRunner::new(&clock, &set, 1).ntimes(), DEFAULT_NTIMES);
        assert_eq!(TrialRunner::new(&clock, &set, 2).ntimes(), 2);
    }

    #[test]
    fn test_second_run_rejected() {
        let (mut ws, set, pool) = fixture();
        let clock = StepClock::new(1.0);
        let mut runner = TrialRunner::new(&clock, &set, 2);
        runner.run(&mut ws, &pool).unwrap();
        let err = runner.run(&mut ws, &pool).unwrap_err();
        assert!(matches!(err, MembenchError::RunnerState { expected: "idle", actual: "done" }));
    }

    #[test]
    fn test_kernels_actually_execute() {
        let (mut ws, set, pool) = fixture();
        let clock = StepClock::new(1.0);
        TrialRunner::new(&clock, &set, 2).run(&mut ws, &pool).unwrap();
        // Two repetitions without warm-up: a = 1 -> 15 -> 225.
        assert!(ws.a().iter().all(|&x| x == 225.0));
    }

    #[test]
    fn test_matrix_from_rows() {
        let m = TimingMatrix::from_rows(vec![vec![9.0, 1.0, 2.0], vec![9.0, 3.0, 4.0]]).unwrap();
        assert_eq!(m.retained(0), &[1.0, 2.0]);
        assert_eq!(m.retained(1), &[3.0, 4.0]);
        assert!(TimingMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
