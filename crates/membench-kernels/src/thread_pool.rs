//! Worker pool the kernels run on.
//!
//! Wraps a dedicated [`rayon::ThreadPool`] so that the thread count of a run
//! is fixed up front and every parallel pass (first-touch initialisation,
//! warm-up and the timed kernels) executes on the same set of workers.

use membench_common::{MembenchError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Configuration for [`BenchThreadPool`].
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads. Defaults to the number of available CPUs.
    pub num_threads: usize,
    /// Prefix for worker thread names.
    pub name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self { num_threads: num_cpus::get().max(1), name_prefix: "membench".to_string() }
    }
}

impl ThreadPoolConfig {
    /// `None` selects every available CPU.
    pub fn with_threads(threads: Option<usize>) -> Self {
        let mut config = Self::default();
        if let Some(n) = threads {
            config.num_threads = n;
        }
        config
    }
}

/// A fixed-size fork-join pool for one benchmark run.
pub struct BenchThreadPool {
    pool: rayon::ThreadPool,
    config: ThreadPoolConfig,
    installs: AtomicU64,
}

impl std::fmt::Debug for BenchThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchThreadPool")
            .field("num_threads", &self.config.num_threads)
            .field("installs", &self.installs())
            .finish()
    }
}

impl BenchThreadPool {
    /// Build a pool from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MembenchError::ThreadPool`] if the thread count is zero or
    /// rayon cannot spawn the workers.
    pub fn new(config: ThreadPoolConfig) -> Result<Self> {
        if config.num_threads == 0 {
            return Err(MembenchError::ThreadPool("thread count must be at least 1".into()));
        }
        let prefix = config.name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |idx| format!("{prefix}-{idx}"))
            .build()
            .map_err(|e| MembenchError::ThreadPool(e.to_string()))?;

        tracing::debug!(num_threads = config.num_threads, "thread pool ready");
        Ok(Self { pool, config, installs: AtomicU64::new(0) })
    }

    /// Pool sized by a configured thread count (`None` = all CPUs).
    pub fn with_threads(threads: Option<usize>) -> Result<Self> {
        Self::new(ThreadPoolConfig::with_threads(threads))
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn config(&self) -> &ThreadPoolConfig {
        &self.config
    }

    /// Number of closures executed through [`install`](Self::install).
    pub fn installs(&self) -> u64 {
        self.installs.load(Ordering::Relaxed)
    }

    /// Run `op` inside the pool; parallel iterators inside it use these
    /// workers and are joined before `install` returns.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.installs.fetch_add(1, Ordering::Relaxed);
        self.pool.install(op)
    }
}
