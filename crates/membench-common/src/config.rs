//! Benchmark configuration.
//!
//! Loads [`BenchConfig`] from a TOML file (`membench.toml`) with environment
//! variable overrides via `MEMBENCH_*` prefixed variables. Every field has a
//! default, so a partial file is valid.

use crate::error::ConfigError;
use crate::types::{ClockSource, ElementType, INDEX_BYTES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Default number of live elements per primary array.
pub const DEFAULT_ARRAY_SIZE: usize = 10_000_000;
/// Default number of elements in the index and gather arrays.
pub const DEFAULT_INDEX_ARRAY_SIZE: usize = 10_000_000;
/// Default repetition count. Also the value a too-small count is raised to.
pub const DEFAULT_NTIMES: usize = 10;
/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "membench.toml";

/// Optional indexed kernels appended after Copy/Scale/Add/Triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexedKernels {
    pub gather: bool,
    pub scatter: bool,
    pub indirect_dot: bool,
}

impl IndexedKernels {
    /// All three indexed kernels enabled.
    pub const fn all() -> Self {
        Self { gather: true, scatter: true, indirect_dot: true }
    }

    /// Whether any indexed kernel is enabled, i.e. whether D and I exist.
    pub const fn any(&self) -> bool {
        self.gather || self.scatter || self.indirect_dot
    }
}

/// Configuration for a single benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Live elements per primary array.
    /// Override: `MEMBENCH_ARRAY_SIZE`
    pub array_size: usize,

    /// Elements in the index array and the gather target.
    /// Override: `MEMBENCH_INDEX_ARRAY_SIZE`
    pub index_array_size: usize,

    /// Padding elements placed before each array's live region.
    /// Override: `MEMBENCH_OFFSET`
    pub offset: usize,

    /// Element precision.
    /// Override: `MEMBENCH_ELEMENT_TYPE`
    pub element_type: ElementType,

    /// Timed repetitions per kernel. The first one is discarded.
    /// Override: `MEMBENCH_NTIMES`
    pub ntimes: usize,

    /// Indexed kernels to append to the kernel set.
    /// Overrides: `MEMBENCH_GATHER`, `MEMBENCH_SCATTER`, `MEMBENCH_INDIRECT_DOT`
    pub kernels: IndexedKernels,

    /// Apply a Fisher-Yates shuffle to the index array.
    /// Override: `MEMBENCH_PERMUTE_INDEX`
    pub permute_index: bool,

    /// Shuffle seed. `None` derives one from the current time.
    /// Override: `MEMBENCH_SEED` (`time` clears it)
    pub seed: Option<u64>,

    /// Worker threads. `None` uses every logical CPU.
    /// Override: `MEMBENCH_THREADS` (`auto` clears it)
    pub threads: Option<usize>,

    /// Time source for calibration and kernel timing.
    /// Override: `MEMBENCH_CLOCK`
    pub clock: ClockSource,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            array_size: DEFAULT_ARRAY_SIZE,
            index_array_size: DEFAULT_INDEX_ARRAY_SIZE,
            offset: 0,
            element_type: ElementType::F64,
            ntimes: DEFAULT_NTIMES,
            kernels: IndexedKernels::default(),
            permute_index: false,
            seed: None,
            threads: None,
            clock: ClockSource::Monotonic,
        }
    }
}

impl BenchConfig {
    /// Generate a default configuration TOML string.
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    /// Serialize this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from a TOML string, then apply environment overrides.
    ///
    /// The result is not validated: later layers (command-line flags) may
    /// still complete it. Call [`validate`](Self::validate) before running.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: BenchConfig = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    ///
    /// Not validated; see [`from_toml`](Self::from_toml).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Check for configurations that cannot run at all.
    ///
    /// A repetition count of 0 or 1 is not rejected here; see [`normalize`](Self::normalize).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.array_size == 0 {
            return Err(ConfigError::Validation("array_size must be > 0".into()));
        }
        if self.kernels.any() {
            if self.index_array_size == 0 {
                return Err(ConfigError::Validation(
                    "index_array_size must be > 0 when indexed kernels are enabled".into(),
                ));
            }
            // Indices are stored as u32 and must address every live element.
            if self.array_size > u32::MAX as usize + 1 {
                return Err(ConfigError::Validation(format!(
                    "array_size must be <= {} when indexed kernels are enabled, got {}",
                    u32::MAX as u64 + 1,
                    self.array_size
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Validation("threads must be > 0".into()));
        }
        if self.footprint_bytes().is_none() {
            return Err(ConfigError::Validation(
                "array sizes overflow the addressable memory".into(),
            ));
        }
        Ok(())
    }

    /// Correct recoverable settings in place, returning one note per change.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.ntimes <= 1 {
            notes.push(format!(
                "ntimes = {} leaves no sample after the warm-up repetition; using {}",
                self.ntimes, DEFAULT_NTIMES
            ));
            tracing::info!(requested = self.ntimes, using = DEFAULT_NTIMES, "raising repetition count");
            self.ntimes = DEFAULT_NTIMES;
        }
        if !self.kernels.any() && self.permute_index {
            notes.push("permute_index has no effect without indexed kernels".to_string());
        }
        notes
    }

    /// Bytes per element of the primary arrays.
    pub fn element_bytes(&self) -> usize {
        self.element_type.size_bytes()
    }

    /// Bytes of one primary array including its offset padding.
    pub fn array_bytes(&self) -> Option<usize> {
        self.array_size.checked_add(self.offset)?.checked_mul(self.element_bytes())
    }

    /// Total bytes the workspace allocates for this configuration.
    pub fn footprint_bytes(&self) -> Option<usize> {
        let elem = self.element_bytes();
        let primary = self.array_size.checked_add(self.offset)?;
        let mut total = primary.checked_mul(elem)?.checked_mul(3)?;
        if self.kernels.any() {
            let indexed = self.index_array_size.checked_add(self.offset)?;
            total = total.checked_add(indexed.checked_mul(elem)?)?;
            total = total.checked_add(indexed.checked_mul(INDEX_BYTES)?)?;
            if self.kernels.indirect_dot {
                let chunks = self.index_array_size.div_ceil(crate::DOT_CHUNK);
                total = total.checked_add(chunks.checked_mul(elem)?)?;
            }
        }
        if self.kernels.scatter {
            total = total.checked_add(primary.checked_mul(elem)?)?;
        }
        Some(total)
    }

    /// Apply `MEMBENCH_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<usize>("MEMBENCH_ARRAY_SIZE")? {
            self.array_size = v;
        }
        if let Some(v) = env_parse::<usize>("MEMBENCH_INDEX_ARRAY_SIZE")? {
            self.index_array_size = v;
        }
        if let Some(v) = env_parse::<usize>("MEMBENCH_OFFSET")? {
            self.offset = v;
        }
        if let Some(v) = env_parse::<ElementType>("MEMBENCH_ELEMENT_TYPE")? {
            self.element_type = v;
        }
        if let Some(v) = env_parse::<usize>("MEMBENCH_NTIMES")? {
            self.ntimes = v;
        }
        if let Some(v) = env_flag("MEMBENCH_GATHER") {
            self.kernels.gather = v;
        }
        if let Some(v) = env_flag("MEMBENCH_SCATTER") {
            self.kernels.scatter = v;
        }
        if let Some(v) = env_flag("MEMBENCH_INDIRECT_DOT") {
            self.kernels.indirect_dot = v;
        }
        if let Some(v) = env_flag("MEMBENCH_PERMUTE_INDEX") {
            self.permute_index = v;
        }
        if let Ok(val) = std::env::var("MEMBENCH_SEED") {
            self.seed = if val.eq_ignore_ascii_case("time") {
                None
            } else {
                Some(val.parse::<u64>().map_err(|e| ConfigError::EnvOverride {
                    key: "MEMBENCH_SEED".into(),
                    value: val.clone(),
                    reason: e.to_string(),
                })?)
            };
        }
        if let Ok(val) = std::env::var("MEMBENCH_THREADS") {
            self.threads = if val.eq_ignore_ascii_case("auto") {
                None
            } else {
                Some(val.parse::<usize>().map_err(|e| ConfigError::EnvOverride {
                    key: "MEMBENCH_THREADS".into(),
                    value: val.clone(),
                    reason: e.to_string(),
                })?)
            };
        }
        if let Some(v) = env_parse::<ClockSource>("MEMBENCH_CLOCK")? {
            self.clock = v;
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val.parse::<T>().map(Some).map_err(|e| ConfigError::EnvOverride {
            key: key.into(),
            value: val.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
