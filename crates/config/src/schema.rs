//! Logging configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or YAML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims the file path and treats an empty one as unset.

use condlog_ports::Level;
use condlog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default console type.
pub const DEFAULT_CONSOLE_TYPE: ConsoleType = ConsoleType::Color;
/// Default console level.
pub const DEFAULT_CONSOLE_LEVEL: Level = Level::Debug;
/// Default file level.
pub const DEFAULT_FILE_LEVEL: Level = Level::Debug;
/// Default main logger level.
pub const DEFAULT_MAIN_LEVEL: Level = Level::Info;
/// Default context logger level.
pub const DEFAULT_CONTEXT_LEVEL: Level = Level::Debug;
/// Default level at and below which context entries are buffered.
pub const DEFAULT_CONTEXT_CONDITIONAL_LEVEL: Level = Level::Debug;
/// Default level at and above which a context entry triggers the flush.
pub const DEFAULT_CONTEXT_TRIGGER_LEVEL: Level = Level::Error;

const SINK_LEVELS: &[Level] = &[
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
];
const LOGGER_LEVELS: &[Level] = &[
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Disabled,
];

/// How entries are written to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleType {
    /// Human-friendly and colourised.
    Color,
    /// Human-friendly without colour.
    NoColor,
    /// Raw JSON lines.
    Json,
    /// Nothing is written to the console.
    Disable,
}

impl ConsoleType {
    /// Stable config/CLI value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::NoColor => "nocolor",
            Self::Json => "json",
            Self::Disable => "disable",
        }
    }

    /// Parse a config/CLI value.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "color" => Some(Self::Color),
            "nocolor" => Some(Self::NoColor),
            "json" => Some(Self::Json),
            "disable" => Some(Self::Disable),
            _ => None,
        }
    }
}

impl fmt::Display for ConsoleType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ConsoleType {
    type Err = ConfigSchemaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input).ok_or_else(|| ConfigSchemaError::InvalidConsoleType {
            value: input.to_owned(),
        })
    }
}

/// Top-level logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Console output.
    pub console: ConsoleConfig,
    /// Append-only JSON file output.
    pub file: FileConfig,
    /// The main logger.
    pub main: MainConfig,
    /// Per-session context loggers.
    pub context: ContextConfig,
}

impl LoggingConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedLoggingConfig, ConfigSchemaError> {
        self.file.normalize();

        check_level("console", "level", self.console.level, SINK_LEVELS)?;
        check_level("file", "level", self.file.level, SINK_LEVELS)?;
        check_level("main", "level", self.main.level, LOGGER_LEVELS)?;
        check_level("context", "level", self.context.level, LOGGER_LEVELS)?;
        check_level(
            "context",
            "conditionalLevel",
            self.context.conditional_level,
            SINK_LEVELS,
        )?;
        check_level(
            "context",
            "triggerLevel",
            self.context.trigger_level,
            SINK_LEVELS,
        )?;

        Ok(ValidatedLoggingConfig { raw: self })
    }
}

/// Console output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConsoleConfig {
    /// Console type.
    #[serde(rename = "type")]
    pub kind: ConsoleType,
    /// Entries below this level are filtered out.
    pub level: Level,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            kind: DEFAULT_CONSOLE_TYPE,
            level: DEFAULT_CONSOLE_LEVEL,
        }
    }
}

/// File output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FileConfig {
    /// File to append JSON entries to. Unset disables file output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Entries below this level are filtered out.
    pub level: Level,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: DEFAULT_FILE_LEVEL,
        }
    }
}

impl FileConfig {
    fn normalize(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        self.path = match path.to_str() {
            Some(value) => Some(value.trim())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            None => Some(path),
        };
    }
}

/// Main logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MainConfig {
    /// Minimum level; `disabled` turns the main logger off.
    pub level: Level,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_MAIN_LEVEL,
        }
    }
}

/// Context logger settings.
///
/// Entries at `conditionalLevel` or below are buffered per session until an
/// entry at `triggerLevel` or above arrives. Setting both to the same level
/// disables buffering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ContextConfig {
    /// Minimum level; `disabled` turns context loggers off.
    pub level: Level,
    /// Buffer entries at this level and below until triggered.
    pub conditional_level: Level,
    /// An entry at this level or above triggers the flush.
    pub trigger_level: Level,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_CONTEXT_LEVEL,
            conditional_level: DEFAULT_CONTEXT_CONDITIONAL_LEVEL,
            trigger_level: DEFAULT_CONTEXT_TRIGGER_LEVEL,
        }
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLoggingConfig {
    raw: LoggingConfig,
}

impl ValidatedLoggingConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &LoggingConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> LoggingConfig {
        self.raw
    }
}

impl AsRef<LoggingConfig> for ValidatedLoggingConfig {
    fn as_ref(&self) -> &LoggingConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedLoggingConfig {
    type Target = LoggingConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Document shape of config files: the logging section under `logging`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct ConfigDocument {
    pub(crate) logging: LoggingConfig,
}

/// Parse a logging config from a JSON document, applying validation and normalization.
pub fn parse_logging_config_json(input: &str) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let document: ConfigDocument = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    document.logging.validate_and_normalize().map_err(Into::into)
}

/// Parse a logging config from a YAML document, applying validation and normalization.
pub fn parse_logging_config_yaml(input: &str) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let document = parse_yaml_document(input)?;
    document.logging.validate_and_normalize().map_err(Into::into)
}

pub(crate) fn parse_yaml_document(input: &str) -> Result<ConfigDocument, ErrorEnvelope> {
    if input.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    serde_yaml_ng::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_yaml"),
            format!("invalid config YAML: {error}"),
        )
    })
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// A level is valid in general but not allowed for this field.
    LevelNotAllowed {
        /// Schema section (e.g. `console`).
        section: &'static str,
        /// Field name in the config file (e.g. `level`).
        field: &'static str,
        /// Level provided.
        level: Level,
        /// Levels accepted by the field.
        allowed: &'static [Level],
    },
    /// Unknown console type.
    InvalidConsoleType {
        /// Value provided.
        value: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::LevelNotAllowed { .. } => ErrorCode::new("config", "invalid_level"),
            Self::InvalidConsoleType { .. } => ErrorCode::new("config", "invalid_console_type"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelNotAllowed {
                section,
                field,
                level,
                allowed,
            } => write!(
                formatter,
                "{section}.{field} must be one of {} (got {level})",
                join_levels(allowed)
            ),
            Self::InvalidConsoleType { value } => write!(
                formatter,
                "invalid console type {value:?}; use color, nocolor, json, or disable"
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::LevelNotAllowed {
                section,
                field,
                level,
                allowed,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", level.as_str())
                .with_metadata("allowed", join_levels(allowed)),
            ConfigSchemaError::InvalidConsoleType { value } => envelope.with_metadata("value", value),
        }
    }
}

fn check_level(
    section: &'static str,
    field: &'static str,
    level: Level,
    allowed: &'static [Level],
) -> Result<(), ConfigSchemaError> {
    if allowed.contains(&level) {
        return Ok(());
    }
    Err(ConfigSchemaError::LevelNotAllowed {
        section,
        field,
        level,
        allowed,
    })
}

fn join_levels(levels: &[Level]) -> String {
    levels
        .iter()
        .map(|level| level.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
