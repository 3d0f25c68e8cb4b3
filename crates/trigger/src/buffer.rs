//! The trigger-level buffered session.

use crate::pool::BufferPool;
use crate::record::{decode_records, encode_record};
use crate::sync::{Mutex, lock};
use crate::TriggerError;
use condlog_ports::{Downstream, Level, LevelSink};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Buffers entries at or below a conditional level until an entry at or
/// above the trigger level arrives.
///
/// - Before the trigger, entries `<= conditional_level` are held back and
///   everything else is forwarded immediately.
/// - The first entry `>= trigger_level` (or an explicit [`TriggerBuffer::trigger`])
///   flushes the held entries downstream in arrival order; from then on
///   every entry is forwarded.
/// - Held entries of a session that never triggers are discarded on close.
///
/// One session is meant to live for one request or unit of work. Its buffer
/// is checked out of a [`BufferPool`] and returned on [`TriggerBuffer::close`]
/// (or drop).
pub struct TriggerBuffer {
    downstream: Downstream,
    conditional_level: Level,
    trigger_level: Level,
    pool: Arc<BufferPool>,
    state: Mutex<SessionState>,
}

struct SessionState {
    /// `None` once closed.
    buffer: Option<Vec<u8>>,
    triggered: bool,
}

impl SessionState {
    fn trigger(&mut self, downstream: &Downstream) -> Result<(), TriggerError> {
        let buffer = self.buffer.as_mut().ok_or(TriggerError::InvalidWriter)?;
        if self.triggered {
            return Ok(());
        }
        self.triggered = true;

        let drained = drain(buffer, downstream);
        buffer.clear();
        drained
    }
}

fn drain(buffer: &[u8], downstream: &Downstream) -> Result<(), TriggerError> {
    for record in decode_records(buffer) {
        let record = record?;
        downstream.write(record.level, record.entry)?;
    }
    Ok(())
}

impl TriggerBuffer {
    /// Create a session drawing its buffer from the process-wide pool.
    pub fn new(downstream: Downstream, conditional_level: Level, trigger_level: Level) -> Self {
        Self::with_pool(
            BufferPool::global(),
            downstream,
            conditional_level,
            trigger_level,
        )
    }

    /// Create a session drawing its buffer from `pool`.
    pub fn with_pool(
        pool: Arc<BufferPool>,
        downstream: Downstream,
        conditional_level: Level,
        trigger_level: Level,
    ) -> Self {
        let buffer = pool.acquire();
        Self {
            downstream,
            conditional_level,
            trigger_level,
            pool,
            state: Mutex::new(SessionState {
                buffer: Some(buffer),
                triggered: false,
            }),
        }
    }

    /// Level at or below which entries are held until triggered.
    pub const fn conditional_level(&self) -> Level {
        self.conditional_level
    }

    /// Level at or above which an entry triggers the flush.
    pub const fn trigger_level(&self) -> Level {
        self.trigger_level
    }

    /// Buffer or forward one newline-terminated entry.
    ///
    /// On success the entry is either held in the session buffer or has been
    /// handed to the downstream sink, never both.
    pub fn write_entry(&self, level: Level, entry: &[u8]) -> Result<(), TriggerError> {
        let mut state = lock(&self.state);
        if state.buffer.is_none() {
            return Err(TriggerError::InvalidWriter);
        }

        if !state.triggered && level >= self.trigger_level {
            state.trigger(&self.downstream)?;
        }

        if !state.triggered && level <= self.conditional_level {
            let buffer = state.buffer.as_mut().ok_or(TriggerError::InvalidWriter)?;
            return encode_record(buffer, level, entry);
        }

        self.downstream.write(level, entry)?;
        Ok(())
    }

    /// Flush held entries and switch to pass-through, if not already done.
    ///
    /// A downstream failure stops the flush; entries not yet written are
    /// lost and the session stays triggered, so calling this again is a
    /// no-op rather than a retry.
    pub fn trigger(&self) -> Result<(), TriggerError> {
        lock(&self.state).trigger(&self.downstream)
    }

    /// Return the buffer to the pool. Further writes fail with
    /// [`TriggerError::InvalidWriter`]; closing again does nothing.
    pub fn close(&self) {
        let buffer = lock(&self.state).buffer.take();
        if let Some(buffer) = buffer {
            self.pool.release(buffer);
        }
    }

    /// Returns true once the session has been triggered.
    pub fn is_triggered(&self) -> bool {
        lock(&self.state).triggered
    }

    /// Returns true once the session has been closed.
    pub fn is_closed(&self) -> bool {
        lock(&self.state).buffer.is_none()
    }

    /// Bytes currently held back, including per-record framing.
    pub fn pending_bytes(&self) -> usize {
        lock(&self.state).buffer.as_ref().map_or(0, Vec::len)
    }
}

impl Drop for TriggerBuffer {
    fn drop(&mut self) {
        self.close();
    }
}

impl LevelSink for TriggerBuffer {
    fn write_level(&self, level: Level, entry: &[u8]) -> io::Result<()> {
        self.write_entry(level, entry).map_err(io::Error::from)
    }
}

impl fmt::Debug for TriggerBuffer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        formatter
            .debug_struct("TriggerBuffer")
            .field("downstream", &self.downstream)
            .field("conditional_level", &self.conditional_level)
            .field("trigger_level", &self.trigger_level)
            .field("triggered", &state.triggered)
            .field("closed", &state.buffer.is_none())
            .finish_non_exhaustive()
    }
}
