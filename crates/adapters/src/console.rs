//! Human-readable console rendering of JSON log lines.
//!
//! A line such as `{"level":"info","time":"...","port":8080,"message":"up"}`
//! renders as `12:30 INF up port=8080`: local `HH:MM` time, a three-letter
//! level, the message, then the remaining fields sorted by key with `error`
//! first. Error payloads may add indented detail lines below the entry.

use crate::logger::{ERROR_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIME_FIELD};
use chrono::{DateTime, Local};
use condlog_ports::{ByteSink, Level, LevelSink};
use condlog_shared::{ErrorCode, ErrorEnvelope};
use serde_json::{Map, Value};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Env var that turns colour off when set to a non-empty value.
pub const ENV_NO_COLOR: &str = "NO_COLOR";

const COLOR_BOLD: u8 = 1;
const COLOR_RED: u8 = 31;
const COLOR_GREEN: u8 = 32;
const COLOR_YELLOW: u8 = 33;
const COLOR_BLUE: u8 = 34;
const COLOR_CYAN: u8 = 36;
const COLOR_DARK_GRAY: u8 = 90;

/// Errors produced while rendering one line.
#[derive(Debug)]
pub enum RenderError {
    /// The line is not valid JSON.
    InvalidJson(serde_json::Error),
    /// The line is JSON but not an object.
    NotAnObject,
}

impl fmt::Display for RenderError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(error) => write!(formatter, "cannot decode event: {error}"),
            Self::NotAnObject => formatter.write_str("cannot decode event: not a JSON object"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJson(error) => Some(error),
            Self::NotAnObject => None,
        }
    }
}

impl From<RenderError> for ErrorEnvelope {
    fn from(error: RenderError) -> Self {
        Self::expected(ErrorCode::new("console", "invalid_event"), error.to_string())
    }
}

impl From<RenderError> for io::Error {
    fn from(error: RenderError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// Renders JSON log lines for a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleRenderer {
    no_color: bool,
}

impl ConsoleRenderer {
    /// Renderer with colour on unless `no_color` is set.
    #[must_use]
    pub const fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    /// Like [`ConsoleRenderer::new`], also turning colour off when
    /// `NO_COLOR` is set in the environment.
    #[must_use]
    pub fn from_env(no_color: bool) -> Self {
        let env_no_color = std::env::var_os(ENV_NO_COLOR).is_some_and(|value| !value.is_empty());
        Self::new(no_color || env_no_color)
    }

    /// Returns true when escape sequences are suppressed.
    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.no_color
    }

    /// Render one JSON line. The result always ends with `\n`.
    pub fn render(&self, line: &[u8]) -> Result<String, RenderError> {
        let value: Value = serde_json::from_slice(line).map_err(RenderError::InvalidJson)?;
        let Value::Object(event) = value else {
            return Err(RenderError::NotAnObject);
        };

        let mut parts = Vec::with_capacity(4);
        parts.push(self.format_time(event.get(TIME_FIELD)));
        parts.push(self.format_level(event.get(LEVEL_FIELD)));
        if let Some(message) = event.get(MESSAGE_FIELD).and_then(format_message) {
            parts.push(message);
        }

        let mut output = String::new();
        for part in parts.into_iter().filter(|part| !part.is_empty()) {
            if !output.is_empty() {
                output.push(' ');
            }
            output.push_str(&part);
        }
        self.write_fields(&event, &mut output);
        self.write_error_details(&event, &mut output);
        output.push('\n');
        Ok(output)
    }

    fn colorize(&self, text: &str, color: u8) -> String {
        if self.no_color || color == 0 {
            text.to_owned()
        } else {
            format!("\x1b[{color}m{text}\x1b[0m")
        }
    }

    fn format_time(&self, value: Option<&Value>) -> String {
        let text = match value {
            None | Some(Value::Null) => "<nil>".to_owned(),
            Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw).map_or_else(
                |_| raw.clone(),
                |time| time.with_timezone(&Local).format("%H:%M").to_string(),
            ),
            Some(Value::Number(number)) => number
                .as_i64()
                .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
                .map_or_else(
                    || number.to_string(),
                    |time| time.with_timezone(&Local).format("%H:%M").to_string(),
                ),
            Some(other) => other.to_string(),
        };
        self.colorize(&text, COLOR_DARK_GRAY)
    }

    fn format_level(&self, value: Option<&Value>) -> String {
        match value {
            Some(Value::String(raw)) => match raw.parse::<Level>() {
                Ok(level) if level != Level::Disabled => {
                    self.colorize(level.short(), level_color(level))
                },
                _ => abbreviate(raw),
            },
            None | Some(Value::Null) => "???".to_owned(),
            Some(other) => abbreviate(&other.to_string()),
        }
    }

    fn write_fields(&self, event: &Map<String, Value>, output: &mut String) {
        if let Some(error) = event.get(ERROR_FIELD) {
            output.push(' ');
            output.push_str(&self.colorize(&format!("{ERROR_FIELD}="), COLOR_CYAN));
            let message = quote_if_needed(&error_message(error));
            output.push_str(&self.colorize(&self.colorize(&message, COLOR_BOLD), COLOR_RED));
        }

        let mut keys: Vec<&String> = event
            .keys()
            .filter(|key| {
                ![LEVEL_FIELD, TIME_FIELD, MESSAGE_FIELD, ERROR_FIELD].contains(&key.as_str())
            })
            .collect();
        keys.sort();

        for key in keys {
            output.push(' ');
            output.push_str(&self.colorize(&format!("{key}="), COLOR_CYAN));
            output.push_str(&format_field_value(&event[key]));
        }
    }

    /// Detail lines come from the error payload's keys other than the message.
    /// The `stack` key is shown only for events at error level or above.
    fn write_error_details(&self, event: &Map<String, Value>, output: &mut String) {
        let Some(Value::Object(error)) = event.get(ERROR_FIELD) else {
            return;
        };
        let severe = event
            .get(LEVEL_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<Level>().ok())
            .is_some_and(|level| level >= Level::Error && level != Level::Disabled);

        for (key, value) in error {
            if key == ERROR_FIELD || (key == "stack" && !severe) {
                continue;
            }
            let detail = match value {
                Value::Array(items) if key == "stack" => items
                    .iter()
                    .map(|item| format!("\n    {}", format_field_value(item)))
                    .collect::<String>(),
                _ => format!(" {}", format_field_value(value)),
            };
            output.push('\n');
            output.push_str(&self.colorize(&format!("{key}:{detail}"), COLOR_RED));
        }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::from_env(false)
    }
}

/// Sink that renders each JSON entry before handing it to the output.
#[derive(Clone)]
pub struct PrettySink {
    renderer: ConsoleRenderer,
    output: Arc<dyn ByteSink>,
}

impl PrettySink {
    /// Render entries with `renderer` and write them to `output`.
    pub fn new(renderer: ConsoleRenderer, output: Arc<dyn ByteSink>) -> Self {
        Self { renderer, output }
    }
}

impl ByteSink for PrettySink {
    fn write_entry(&self, entry: &[u8]) -> io::Result<()> {
        let rendered = self.renderer.render(entry)?;
        self.output.write_entry(rendered.as_bytes())
    }
}

impl LevelSink for PrettySink {
    fn write_level(&self, _level: Level, entry: &[u8]) -> io::Result<()> {
        self.write_entry(entry)
    }
}

const fn level_color(level: Level) -> u8 {
    match level {
        Level::Trace => COLOR_BLUE,
        Level::Info => COLOR_GREEN,
        Level::Warn => COLOR_YELLOW,
        Level::Error | Level::Fatal | Level::Panic => COLOR_RED,
        Level::Debug | Level::Disabled => 0,
    }
}

fn abbreviate(raw: &str) -> String {
    if raw.is_empty() {
        return "???".to_owned();
    }
    raw.chars().take(3).collect::<String>().to_uppercase()
}

fn format_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(map) => map
            .get(ERROR_FIELD)
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned),
        other => other.to_string(),
    }
}

fn format_field_value(value: &Value) -> String {
    match value {
        Value::String(text) => quote_if_needed(text),
        other => other.to_string(),
    }
}

fn quote_if_needed(text: &str) -> String {
    if needs_quote(text) {
        format!("{text:?}")
    } else {
        text.to_owned()
    }
}

/// Control bytes, non-ASCII, spaces, backslashes, and quotes force quoting.
fn needs_quote(text: &str) -> bool {
    text.bytes()
        .any(|byte| !(0x20..=0x7e).contains(&byte) || matches!(byte, b' ' | b'\\' | b'"'))
}
