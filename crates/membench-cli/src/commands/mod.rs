//! CLI command implementations

pub mod config;
pub mod info;
pub mod run;

pub use config::ConfigAction;
pub use run::RunCommand;
