//! CLI command handlers.

pub mod config;
pub mod pretty;

pub use config::run_config;
pub use pretty::run_pretty;
