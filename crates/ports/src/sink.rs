//! Sink contracts for fully formed log entries.
//!
//! Every write carries exactly one serialized entry terminated by `\n`.
//! Sinks are shared between many loggers and sessions, so implementations
//! must be safe for concurrent use.

use crate::Level;
use std::io;
use std::sync::Arc;

/// A sink that accepts raw entry bytes with no severity information.
pub trait ByteSink: Send + Sync {
    /// Write one complete entry.
    fn write_entry(&self, entry: &[u8]) -> io::Result<()>;
}

/// A sink that dispatches on the severity of each entry.
pub trait LevelSink: Send + Sync {
    /// Write one complete entry at `level`.
    fn write_level(&self, level: Level, entry: &[u8]) -> io::Result<()>;
}

/// Destination of a decorator such as the trigger buffer.
///
/// Level-aware sinks receive the severity of every entry; plain sinks only
/// see the bytes.
#[derive(Clone)]
pub enum Downstream {
    /// Sink that understands levels.
    Leveled(Arc<dyn LevelSink>),
    /// Sink that only understands bytes.
    Plain(Arc<dyn ByteSink>),
}

impl Downstream {
    /// Forward one entry, keeping `level` when the sink can use it.
    pub fn write(&self, level: Level, entry: &[u8]) -> io::Result<()> {
        match self {
            Self::Leveled(sink) => sink.write_level(level, entry),
            Self::Plain(sink) => sink.write_entry(entry),
        }
    }
}

impl std::fmt::Debug for Downstream {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leveled(_) => formatter.write_str("Downstream::Leveled"),
            Self::Plain(_) => formatter.write_str("Downstream::Plain"),
        }
    }
}

impl From<Arc<dyn LevelSink>> for Downstream {
    fn from(sink: Arc<dyn LevelSink>) -> Self {
        Self::Leveled(sink)
    }
}

impl From<Arc<dyn ByteSink>> for Downstream {
    fn from(sink: Arc<dyn ByteSink>) -> Self {
        Self::Plain(sink)
    }
}
