//! # condlog-adapters
//!
//! Concrete implementations behind the ports: the JSON logger, the console
//! renderer, stdout/stderr/file sinks, level filtering and fan-out, and the
//! `tracing` bridge. This crate depends on `ports` and `shared`.

pub mod console;
pub mod log_sink;
pub mod logger;
pub mod tracing_bridge;

pub use console::{ConsoleRenderer, PrettySink, RenderError};
pub use log_sink::{FileSink, FilteredLevelSink, MultiLevelSink, PlainLevelSink, WriterSink};
pub use logger::JsonLogger;
pub use tracing_bridge::TracingBridge;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
