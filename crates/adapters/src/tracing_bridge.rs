//! `tracing` layer that forwards events to a [`LoggerPort`].
//!
//! Libraries that log through `tracing` end up in the same sinks as the main
//! logger. The `message` field becomes the event message, an `error` field
//! becomes the error payload, and every other field is kept as is. Events
//! inside spans also carry a `span` field naming the span path.

use crate::logger::{ERROR_FIELD, error_value};
use condlog_ports::{Level, LogEvent, LogFields, LoggerPort};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

const MESSAGE: &str = "message";
const SPAN_FIELD: &str = "span";

/// Layer forwarding `tracing` events to a logger.
#[derive(Clone)]
pub struct TracingBridge {
    logger: Arc<dyn LoggerPort>,
}

impl TracingBridge {
    /// Forward events to `logger`.
    pub fn new(logger: Arc<dyn LoggerPort>) -> Self {
        Self { logger }
    }
}

/// Map a `tracing` level onto a log level.
#[must_use]
pub fn level_from_tracing(level: tracing::Level) -> Level {
    match level {
        tracing::Level::TRACE => Level::Trace,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::ERROR => Level::Error,
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.logger.enabled(level_from_tracing(*metadata.level()))
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let level = level_from_tracing(*event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                visitor
                    .fields
                    .insert(Box::from(SPAN_FIELD), Value::String(spans.join(" > ")));
            }
        }

        let mut log_event = LogEvent::new(level, &visitor.message.unwrap_or_default());
        if !visitor.fields.is_empty() {
            log_event = log_event.with_fields(visitor.fields);
        }
        if let Some(error) = visitor.error {
            log_event = log_event.with_error(error);
        }
        self.logger.log(log_event);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    error: Option<Value>,
    fields: LogFields,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(Box::from(field.name()), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut text = String::new();
        let _ = write!(text, "{value:?}");
        match field.name() {
            MESSAGE => self.message = Some(text),
            ERROR_FIELD => self.error = Some(error_value(&text)),
            _ => self.insert(field, Value::String(text)),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            MESSAGE => self.message = Some(value.to_owned()),
            ERROR_FIELD => self.error = Some(error_value(&value)),
            _ => self.insert(field, Value::String(value.to_owned())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            self.insert(field, Value::Number(number));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() == ERROR_FIELD {
            self.error = Some(error_value(&value));
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }
}
