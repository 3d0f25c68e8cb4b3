//! # condlog-facade
//!
//! Entry point for applications: turns a validated logging config into a main
//! logger and a factory of per-request context sessions, and pretty-prints
//! JSON log streams. This crate sits on top of `adapters`, `config`, and
//! `trigger`.
//!
//! ```
//! use condlog_config::{ConsoleType, LoggingConfig};
//! use condlog_facade::init_logging;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = LoggingConfig::default();
//! config.console.kind = ConsoleType::Disable;
//! let logging = init_logging(&config.validate_and_normalize()?)?;
//!
//! let session = logging.context().open();
//! session.logger().debug("only written if something goes wrong", None);
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod logging;
pub mod pretty;

pub use context::{ContextFactory, ContextSession};
pub use logging::{Logging, init_logging, init_logging_with_console};
pub use pretty::pretty_log;

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
