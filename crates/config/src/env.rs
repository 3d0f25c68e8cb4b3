//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present must hold a valid value.
//! The one exception is `CONDLOG_FILE_PATH`, where an empty value clears a
//! path set by the config file.

use crate::schema::{ConsoleType, LoggingConfig, ValidatedLoggingConfig};
use condlog_ports::Level;
use condlog_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Env var: console type.
pub const ENV_CONSOLE_TYPE: &str = "CONDLOG_CONSOLE_TYPE";
/// Env var: console level.
pub const ENV_CONSOLE_LEVEL: &str = "CONDLOG_CONSOLE_LEVEL";
/// Env var: log file path.
pub const ENV_FILE_PATH: &str = "CONDLOG_FILE_PATH";
/// Env var: log file level.
pub const ENV_FILE_LEVEL: &str = "CONDLOG_FILE_LEVEL";
/// Env var: main logger level.
pub const ENV_MAIN_LEVEL: &str = "CONDLOG_MAIN_LEVEL";
/// Env var: context logger level.
pub const ENV_CONTEXT_LEVEL: &str = "CONDLOG_CONTEXT_LEVEL";
/// Env var: context conditional level.
pub const ENV_CONTEXT_CONDITIONAL_LEVEL: &str = "CONDLOG_CONTEXT_CONDITIONAL_LEVEL";
/// Env var: context trigger level.
pub const ENV_CONTEXT_TRIGGER_LEVEL: &str = "CONDLOG_CONTEXT_TRIGGER_LEVEL";

const ALL_VARS: [&str; 8] = [
    ENV_CONSOLE_TYPE,
    ENV_CONSOLE_LEVEL,
    ENV_FILE_PATH,
    ENV_FILE_LEVEL,
    ENV_MAIN_LEVEL,
    ENV_CONTEXT_LEVEL,
    ENV_CONTEXT_CONDITIONAL_LEVEL,
    ENV_CONTEXT_TRIGGER_LEVEL,
];

/// Parsed env overrides. `None` leaves the underlying value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingEnv {
    /// Override for `console.type`.
    pub console_type: Option<ConsoleType>,
    /// Override for `console.level`.
    pub console_level: Option<Level>,
    /// Override for `file.path`; an empty path clears it.
    pub file_path: Option<PathBuf>,
    /// Override for `file.level`.
    pub file_level: Option<Level>,
    /// Override for `main.level`.
    pub main_level: Option<Level>,
    /// Override for `context.level`.
    pub context_level: Option<Level>,
    /// Override for `context.conditionalLevel`.
    pub context_conditional_level: Option<Level>,
    /// Override for `context.triggerLevel`.
    pub context_trigger_level: Option<Level>,
}

impl LoggingEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            console_type: parse_optional_console_type(map, ENV_CONSOLE_TYPE)?,
            console_level: parse_optional_level(map, ENV_CONSOLE_LEVEL)?,
            file_path: map.get(ENV_FILE_PATH).map(|raw| PathBuf::from(raw.trim())),
            file_level: parse_optional_level(map, ENV_FILE_LEVEL)?,
            main_level: parse_optional_level(map, ENV_MAIN_LEVEL)?,
            context_level: parse_optional_level(map, ENV_CONTEXT_LEVEL)?,
            context_conditional_level: parse_optional_level(map, ENV_CONTEXT_CONDITIONAL_LEVEL)?,
            context_trigger_level: parse_optional_level(map, ENV_CONTEXT_TRIGGER_LEVEL)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }
        Self::from_map(&map)
    }

    /// Write every present override into `config` without validating.
    pub fn apply_to(&self, config: &mut LoggingConfig) {
        set(&mut config.console.kind, self.console_type);
        set(&mut config.console.level, self.console_level);
        if let Some(path) = &self.file_path {
            config.file.path = Some(path.clone());
        }
        set(&mut config.file.level, self.file_level);
        set(&mut config.main.level, self.main_level);
        set(&mut config.context.level, self.context_level);
        set(
            &mut config.context.conditional_level,
            self.context_conditional_level,
        );
        set(&mut config.context.trigger_level, self.context_trigger_level);
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: LoggingConfig,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let mut config = base;
    env.apply_to(&mut config);
    config.validate_and_normalize().map_err(Into::into)
}

pub(crate) fn set<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Level env var had an invalid value.
    InvalidLevel {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidLevel { .. } => ErrorCode::new("config", "invalid_env_level"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidLevel { var, value } => {
                write!(formatter, "{var} must be a log level (got {value:?})")
            },
            Self::InvalidEnum { var, value } => {
                write!(formatter, "{var} has an unsupported value {value:?}")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidLevel { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value)
            },
        }
    }
}

fn parse_optional_trimmed<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Level>, EnvParseError> {
    parse_optional_trimmed(map, var)?
        .map(|value| {
            value.parse::<Level>().map_err(|_| EnvParseError::InvalidLevel {
                var,
                value: value.to_owned(),
            })
        })
        .transpose()
}

fn parse_optional_console_type(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<ConsoleType>, EnvParseError> {
    parse_optional_trimmed(map, var)?
        .map(|value| {
            ConsoleType::parse(value).ok_or_else(|| EnvParseError::InvalidEnum {
                var,
                value: value.to_owned(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn absent_vars_leave_config_untouched() -> Result<(), Box<dyn std::error::Error>> {
        let env = LoggingEnv::from_map(&BTreeMap::new())?;
        assert_eq!(env, LoggingEnv::default());

        let config = apply_env_overrides(LoggingConfig::default(), &env)?;
        assert_eq!(config.as_ref(), &LoggingConfig::default());
        Ok(())
    }

    #[test]
    fn values_are_trimmed_and_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let env = LoggingEnv::from_map(&env_map(&[
            (ENV_CONSOLE_TYPE, " JSON "),
            (ENV_MAIN_LEVEL, "Warn"),
            (ENV_CONTEXT_TRIGGER_LEVEL, "warning"),
        ]))?;

        assert_eq!(env.console_type, Some(ConsoleType::Json));
        assert_eq!(env.main_level, Some(Level::Warn));
        assert_eq!(env.context_trigger_level, Some(Level::Warn));
        Ok(())
    }

    #[test]
    fn empty_file_path_clears_configured_path() -> Result<(), Box<dyn std::error::Error>> {
        let mut base = LoggingConfig::default();
        base.file.path = Some(PathBuf::from("/tmp/app.log"));

        let env = LoggingEnv::from_map(&env_map(&[(ENV_FILE_PATH, "")]))?;
        let config = apply_env_overrides(base, &env)?;
        assert_eq!(config.file.path, None);
        Ok(())
    }

    #[test]
    fn invalid_values_map_to_error_codes() {
        let error = LoggingEnv::from_map(&env_map(&[(ENV_FILE_LEVEL, "loud")])).err();
        let envelope = error.map(ErrorEnvelope::from);
        assert_eq!(
            envelope.as_ref().map(|error| error.code.clone()),
            Some(ErrorCode::new("config", "invalid_env_level"))
        );
        assert_eq!(
            envelope
                .as_ref()
                .and_then(|error| error.metadata.get("env_var"))
                .map(String::as_str),
            Some(ENV_FILE_LEVEL)
        );

        let error = LoggingEnv::from_map(&env_map(&[(ENV_CONSOLE_LEVEL, "  ")])).err();
        assert_eq!(
            error,
            Some(EnvParseError::EmptyValue {
                var: ENV_CONSOLE_LEVEL
            })
        );

        let error = LoggingEnv::from_map(&env_map(&[(ENV_CONSOLE_TYPE, "fancy")])).err();
        assert!(matches!(error, Some(EnvParseError::InvalidEnum { .. })));
    }

    #[test]
    fn env_value_is_still_validated() {
        let env = LoggingEnv {
            console_level: Some(Level::Fatal),
            ..LoggingEnv::default()
        };
        let error = apply_env_overrides(LoggingConfig::default(), &env).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "invalid_level"))
        );
    }
}
