//! Common types and utilities for the membench memory bandwidth benchmark
//!
//! This crate provides the foundational types shared across the membench
//! workspace: run configuration, the error taxonomy, and the element/index
//! type descriptors the kernels and the validator agree on.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
