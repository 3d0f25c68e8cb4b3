//! Per-request context sessions.
//!
//! Each session owns a fresh [`TriggerBuffer`] over the shared output, so
//! low-level entries of a request are only written when something in the
//! same request logs at the trigger level (or the session is triggered by
//! hand, e.g. on panic).

use condlog_adapters::JsonLogger;
use condlog_ports::{Downstream, Level, LevelSink, LogFields, LoggerPort, NopLogger};
use condlog_trigger::{BufferPool, TriggerBuffer};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Clone)]
struct ContextSettings {
    sink: Arc<dyn LevelSink>,
    level: Level,
    conditional_level: Level,
    trigger_level: Level,
    pool: Arc<BufferPool>,
}

/// Opens context sessions. A disabled factory opens no-op sessions.
#[derive(Clone)]
pub struct ContextFactory {
    settings: Option<ContextSettings>,
}

impl ContextFactory {
    /// Sessions log at `level` or above into `sink`, holding entries at or
    /// below `conditional_level` until an entry reaches `trigger_level`.
    pub fn new(
        sink: Arc<dyn LevelSink>,
        level: Level,
        conditional_level: Level,
        trigger_level: Level,
    ) -> Self {
        Self {
            settings: Some(ContextSettings {
                sink,
                level,
                conditional_level,
                trigger_level,
                pool: BufferPool::global(),
            }),
        }
    }

    /// Factory whose sessions discard everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { settings: None }
    }

    /// Draw session buffers from `pool` instead of the process-wide pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        if let Some(settings) = &mut self.settings {
            settings.pool = pool;
        }
        self
    }

    /// Returns true when sessions actually log.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// Level of the session loggers (`disabled` for a disabled factory).
    #[must_use]
    pub fn level(&self) -> Level {
        self.settings
            .as_ref()
            .map_or(Level::Disabled, |settings| settings.level)
    }

    /// Open a session.
    #[must_use]
    pub fn open(&self) -> ContextSession {
        self.open_with_fields(LogFields::new())
    }

    /// Open a session whose logger adds `fields` to every entry.
    #[must_use]
    pub fn open_with_fields(&self, fields: LogFields) -> ContextSession {
        let Some(settings) = &self.settings else {
            return ContextSession {
                logger: Arc::new(NopLogger),
                buffer: None,
            };
        };

        let buffer = Arc::new(TriggerBuffer::with_pool(
            Arc::clone(&settings.pool),
            Downstream::Leveled(Arc::clone(&settings.sink)),
            settings.conditional_level,
            settings.trigger_level,
        ));
        let logger = JsonLogger::new(buffer.clone())
            .with_min_level(settings.level)
            .with_base_fields(fields);

        ContextSession {
            logger: Arc::new(logger),
            buffer: Some(buffer),
        }
    }
}

impl std::fmt::Debug for ContextFactory {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = formatter.debug_struct("ContextFactory");
        if let Some(settings) = &self.settings {
            debug
                .field("level", &settings.level)
                .field("conditional_level", &settings.conditional_level)
                .field("trigger_level", &settings.trigger_level);
        } else {
            debug.field("level", &Level::Disabled);
        }
        debug.finish()
    }
}

/// One request's logger and its trigger buffer. Closed on drop.
pub struct ContextSession {
    logger: Arc<dyn LoggerPort>,
    buffer: Option<Arc<TriggerBuffer>>,
}

impl ContextSession {
    /// Logger for this session.
    #[must_use]
    pub fn logger(&self) -> Arc<dyn LoggerPort> {
        Arc::clone(&self.logger)
    }

    /// Flush held entries and pass every later entry straight through.
    pub fn trigger(&self) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        if let Err(error) = buffer.trigger() {
            tracing::warn!(error = %error, "context session could not flush held entries");
        }
    }

    /// Drop held entries and release the buffer. Later writes fail.
    pub fn close(&self) {
        if let Some(buffer) = &self.buffer {
            buffer.close();
        }
    }

    /// Returns true once the session has been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.buffer
            .as_ref()
            .is_some_and(|buffer| buffer.is_triggered())
    }

    /// Run `work` with this session, then close it.
    ///
    /// If `work` panics the session is triggered first, so the held entries
    /// leading up to the panic are written, and the panic then continues.
    pub fn scope<R>(self, work: impl FnOnce(&Self) -> R) -> R {
        match panic::catch_unwind(AssertUnwindSafe(|| work(&self))) {
            Ok(value) => {
                self.close();
                value
            },
            Err(payload) => {
                self.trigger();
                self.close();
                panic::resume_unwind(payload)
            },
        }
    }
}

impl Drop for ContextSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ContextSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ContextSession")
            .field("enabled", &self.buffer.is_some())
            .field("triggered", &self.is_triggered())
            .finish_non_exhaustive()
    }
}
