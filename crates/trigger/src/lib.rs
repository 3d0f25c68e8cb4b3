//! # condlog-trigger
//!
//! Per-session conditional logging: low-severity entries are held in memory
//! and only reach the downstream sink if something at or above a trigger
//! level happens in the same session.
//!
//! ## Example
//!
//! ```
//! use condlog_ports::{ByteSink, Downstream, Level};
//! use condlog_trigger::TriggerBuffer;
//! use std::io;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Lines(Mutex<Vec<u8>>);
//!
//! impl ByteSink for Lines {
//!     fn write_entry(&self, entry: &[u8]) -> io::Result<()> {
//!         self.0.lock().map_err(|_| io::Error::other("poisoned"))?.extend_from_slice(entry);
//!         Ok(())
//!     }
//! }
//!
//! let lines = Arc::new(Lines::default());
//! let session = TriggerBuffer::new(
//!     Downstream::Plain(lines.clone()),
//!     Level::Debug,
//!     Level::Error,
//! );
//!
//! session.write_entry(Level::Debug, b"cache miss\n")?;
//! assert!(lines.0.lock().map_err(|_| "poisoned")?.is_empty());
//!
//! session.write_entry(Level::Error, b"request failed\n")?;
//! assert_eq!(
//!     lines.0.lock().map_err(|_| "poisoned")?.as_slice(),
//!     b"cache miss\nrequest failed\n"
//! );
//! session.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod buffer;
mod error;
pub mod pool;
pub mod record;
mod sync;

pub use buffer::TriggerBuffer;
pub use error::TriggerError;
pub use pool::BufferPool;

/// Returns the trigger crate version.
#[must_use]
pub const fn trigger_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
