//! Structured JSON logger adapter.
//!
//! Every event becomes one JSON line written to a [`LevelSink`]. Keys come out
//! in a fixed order: `level`, `time`, the merged fields, `error`, `message`.

use chrono::{SecondsFormat, Utc};
use condlog_ports::{Level, LevelSink, LogEvent, LogFields, LoggerPort};
use serde::Serializer;
use serde::ser::SerializeMap;
use serde_json::Value;
use std::sync::Arc;

/// Key of the severity.
pub const LEVEL_FIELD: &str = "level";
/// Key of the UTC timestamp.
pub const TIME_FIELD: &str = "time";
/// Key of the error payload.
pub const ERROR_FIELD: &str = "error";
/// Key of the message.
pub const MESSAGE_FIELD: &str = "message";

const RESERVED_FIELDS: [&str; 4] = [LEVEL_FIELD, TIME_FIELD, ERROR_FIELD, MESSAGE_FIELD];

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LevelSink>,
    base_fields: LogFields,
    min_level: Level,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LevelSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: Level::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    fn encode(&self, event: &LogEvent) -> serde_json::Result<Vec<u8>> {
        let mut fields = self.base_fields.clone();
        if let Some(extra) = &event.fields {
            fields.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        let mut line = Vec::with_capacity(128);
        let mut serializer = serde_json::Serializer::new(&mut line);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LEVEL_FIELD, event.level.as_str())?;
        map.serialize_entry(TIME_FIELD, &now_timestamp())?;
        for (key, value) in &fields {
            let key: &str = key;
            if RESERVED_FIELDS.contains(&key) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if let Some(error) = &event.error {
            map.serialize_entry(ERROR_FIELD, error)?;
        }
        map.serialize_entry(MESSAGE_FIELD, &*event.message)?;
        map.end()?;

        line.push(b'\n');
        Ok(line)
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if !self.enabled(event.level) {
            return;
        }

        let line = match self.encode(&event) {
            Ok(line) => line,
            Err(error) => {
                report_write_failure(&error);
                return;
            },
        };
        if let Err(error) = self.sink.write_level(event.level, &line) {
            report_write_failure(&error);
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }

    fn level(&self) -> Level {
        self.min_level
    }
}

/// Timestamp in the format every JSON line carries, e.g.
/// `2024-05-01T12:30:45.123Z`.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build an error payload from anything displayable.
#[must_use]
pub fn error_value(error: &dyn std::fmt::Display) -> Value {
    serde_json::json!({ ERROR_FIELD: error.to_string() })
}

fn report_write_failure(error: &dyn std::fmt::Display) {
    eprintln!("logger: could not write event: {error}");
}
