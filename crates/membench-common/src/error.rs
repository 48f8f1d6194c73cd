//! Error types for membench.

use thiserror::Error;

/// Errors that can occur when loading or validating a [`BenchConfig`](crate::BenchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride {
        key: String,
        value: String,
        reason: String,
    },
}

/// Top-level error for a benchmark run.
///
/// Only conditions that stop a run before timing begins are errors. Timer
/// degeneracy and validation failures are carried in the report instead.
#[derive(Debug, Error)]
pub enum MembenchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to allocate array {array}: {bytes} bytes")]
    Allocation { array: &'static str, bytes: usize },

    #[error("insufficient memory: benchmark needs {required} bytes, {available} bytes available")]
    InsufficientMemory { required: u64, available: u64 },

    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(String),

    #[error("trial runner is {actual}, expected {expected}")]
    RunnerState {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, MembenchError>;
