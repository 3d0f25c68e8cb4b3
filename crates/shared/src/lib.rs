//! # condlog-shared
//!
//! Result and error envelope types shared by every condlog crate.
//!
//! Crate-local errors (trigger buffer, level parsing, config schema) stay
//! typed inside their crate and convert into [`ErrorEnvelope`] at the
//! boundary, so callers such as the CLI deal with a single error shape.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod result;

pub use errors::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, UnexpectedError,
    normalize_unexpected_error,
};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
