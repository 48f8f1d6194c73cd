//! membench CLI library
//!
//! Exposes the command implementations and renderers for testing.

pub mod commands;
pub mod config;
pub mod exit;
pub mod logging;
pub mod output;
