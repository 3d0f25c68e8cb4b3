//! Structured logging boundary contract.

use crate::Level;
use std::collections::BTreeMap;

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Structured log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Severity.
    pub level: Level,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
    /// Optional error payload.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    /// Create an event without fields or error.
    pub fn new(level: Level, message: &str) -> Self {
        Self {
            level,
            message: message.to_owned().into_boxed_str(),
            fields: None,
            error: None,
        }
    }

    /// Attach structured fields.
    #[must_use]
    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Attach an error payload.
    #[must_use]
    pub fn with_error(mut self, error: serde_json::Value) -> Self {
        self.error = Some(error);
        self
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event. Events below [`LoggerPort::level`] are dropped.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Minimum level this logger emits.
    fn level(&self) -> Level;

    /// Returns true when events at `level` would be emitted.
    fn enabled(&self, level: Level) -> bool {
        level != Level::Disabled && level >= self.level()
    }

    /// Convenience: trace event.
    fn trace(&self, message: &str, fields: Option<LogFields>) {
        self.log(event(Level::Trace, message, fields));
    }

    /// Convenience: debug event.
    fn debug(&self, message: &str, fields: Option<LogFields>) {
        self.log(event(Level::Debug, message, fields));
    }

    /// Convenience: info event.
    fn info(&self, message: &str, fields: Option<LogFields>) {
        self.log(event(Level::Info, message, fields));
    }

    /// Convenience: warn event.
    fn warn(&self, message: &str, fields: Option<LogFields>) {
        self.log(event(Level::Warn, message, fields));
    }

    /// Convenience: error event.
    fn error(&self, message: &str, fields: Option<LogFields>) {
        self.log(event(Level::Error, message, fields));
    }
}

fn event(level: Level, message: &str, fields: Option<LogFields>) -> LogEvent {
    LogEvent {
        level,
        message: message.to_owned().into_boxed_str(),
        fields,
        error: None,
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl LoggerPort for NopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }

    fn level(&self) -> Level {
        Level::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Capture {
        min: Level,
        events: Arc<Mutex<Vec<LogEvent>>>,
    }

    impl LoggerPort for Capture {
        fn log(&self, event: LogEvent) {
            if self.enabled(event.level) {
                self.events.lock().expect("capture lock").push(event);
            }
        }

        fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
            Box::new(Self {
                min: self.min,
                events: Arc::clone(&self.events),
            })
        }

        fn level(&self) -> Level {
            self.min
        }
    }

    #[test]
    fn helpers_respect_the_minimum_level() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let logger = Capture {
            min: Level::Info,
            events: Arc::clone(&events),
        };

        logger.debug("hidden", None);
        logger.info("shown", None);
        logger.error("also shown", None);

        let messages: Vec<String> = events
            .lock()
            .expect("capture lock")
            .iter()
            .map(|event| event.message.to_string())
            .collect();
        assert_eq!(messages, vec!["shown", "also shown"]);
    }

    #[test]
    fn nop_logger_is_disabled() {
        let logger = NopLogger;
        assert!(!logger.enabled(Level::Panic));
        assert!(!logger.child(LogFields::new()).enabled(Level::Error));
    }

    #[test]
    fn disabled_is_never_enabled() {
        let logger = Capture {
            min: Level::Trace,
            events: Arc::new(Mutex::new(Vec::new())),
        };
        assert!(!logger.enabled(Level::Disabled));
    }
}
