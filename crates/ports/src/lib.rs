//! # condlog-ports
//!
//! Boundary contracts shared by the trigger buffer, the adapters, and the
//! facade: severity levels, the two sink shapes, and the structured logger.
//! It depends only on `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod level;
pub mod logger;
pub mod sink;

pub use level::*;
pub use logger::*;
pub use sink::*;
