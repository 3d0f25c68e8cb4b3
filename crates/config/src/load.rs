//! Config loading helpers (file + env + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::env::set;
use crate::schema::{ConfigDocument, parse_yaml_document};
use crate::{ConsoleType, LoggingConfig, LoggingEnv, ValidatedLoggingConfig};
use condlog_ports::Level;
use condlog_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::{Path, PathBuf};

/// Config file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from the file extension. Paths without an extension
    /// are read as JSON.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json, .yaml, or .yml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Highest-precedence overrides, typically from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingOverrides {
    /// Override for `console.type`.
    pub console_type: Option<ConsoleType>,
    /// Override for `console.level`.
    pub console_level: Option<Level>,
    /// Override for `file.path`.
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

impl LoggingOverrides {
    fn apply_to(&self, config: &mut LoggingConfig) {
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

/// Load the logging config from an in-memory document.
///
/// Precedence (highest wins):
/// - overrides (`LoggingOverrides`)
/// - env overrides (`LoggingEnv`)
/// - config document
/// - defaults (`LoggingConfig::default()`)
pub fn load_logging_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    overrides: &LoggingOverrides,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let mut config = match config_text {
        None => LoggingConfig::default(),
        Some((input, format)) => parse_config_unvalidated(input, format)?,
    };

    env.apply_to(&mut config);
    overrides.apply_to(&mut config);

    // Validation runs once on the merged result.
    config.validate_and_normalize().map_err(Into::into)
}

/// Load the logging config from an optional file path.
pub fn load_logging_config_from_path(
    config_path: Option<&Path>,
    overrides: &LoggingOverrides,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    match config_path {
        None => load_logging_config_from_sources(None, overrides, env),
        Some(path) => {
            let format = ConfigFormat::from_path(path)?;
            let config_text = read_config_file(path)?;
            load_logging_config_from_sources(Some((&config_text, format)), overrides, env)
                .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))
        },
    }
}

/// Load the logging config from std env and an optional file path.
pub fn load_logging_config_std_env(
    config_path: Option<&Path>,
    overrides: &LoggingOverrides,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let env = LoggingEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_logging_config_from_path(config_path, overrides, &env)
}

/// Serialize the config as a pretty JSON document (with trailing newline).
pub fn to_pretty_json(config: &LoggingConfig) -> Result<String, ErrorEnvelope> {
    let document = ConfigDocument {
        logging: config.clone(),
    };
    let mut output = serde_json::to_string_pretty(&document).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as a YAML document.
pub fn to_pretty_yaml(config: &LoggingConfig) -> Result<String, ErrorEnvelope> {
    let document = ConfigDocument {
        logging: config.clone(),
    };
    serde_yaml_ng::to_string(&document).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_yaml"),
            format!("failed to serialize config YAML: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<LoggingConfig, ErrorEnvelope> {
    let document = match format {
        ConfigFormat::Json => serde_json::from_str::<ConfigDocument>(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Yaml => parse_yaml_document(input),
    };
    document
        .map(|document| document.logging)
        .map_err(|error| error.with_metadata("source", "config"))
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_precedence_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{
          "logging": { "main": { "level": "debug" }, "console": { "level": "info" } }
        }"#;

        let env = LoggingEnv {
            main_level: Some(Level::Warn),
            console_level: Some(Level::Warn),
            ..LoggingEnv::default()
        };
        let overrides = LoggingOverrides {
            main_level: Some(Level::Error),
            ..LoggingOverrides::default()
        };

        let config = load_logging_config_from_sources(
            Some((config_json, ConfigFormat::Json)),
            &overrides,
            &env,
        )?;
        assert_eq!(config.main.level, Level::Error);
        assert_eq!(config.console.level, Level::Warn);
        Ok(())
    }

    #[test]
    fn invalid_file_value_overridden_by_flag_succeeds() -> Result<(), Box<dyn std::error::Error>> {
        // `fatal` is not a console level, but the flag replaces it before validation.
        let config_json = r#"{ "logging": { "console": { "level": "fatal" } } }"#;
        let overrides = LoggingOverrides {
            console_level: Some(Level::Info),
            ..LoggingOverrides::default()
        };

        let config = load_logging_config_from_sources(
            Some((config_json, ConfigFormat::Json)),
            &overrides,
            &LoggingEnv::default(),
        )?;
        assert_eq!(config.console.level, Level::Info);
        Ok(())
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_logging_config_from_sources(
            None,
            &LoggingOverrides::default(),
            &LoggingEnv::default(),
        )?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.starts_with("{\n  \"logging\": {"));
        assert!(first.ends_with("}\n"));
        Ok(())
    }

    #[test]
    fn printed_config_parses_back() -> Result<(), Box<dyn std::error::Error>> {
        let mut config = LoggingConfig::default();
        config.file.path = Some(PathBuf::from("app.log"));
        config.context.level = Level::Disabled;

        let json = to_pretty_json(&config)?;
        let reparsed = crate::parse_logging_config_json(&json)?;
        assert_eq!(reparsed.as_ref(), &config);

        let yaml = to_pretty_yaml(&config)?;
        let reparsed = crate::parse_logging_config_yaml(&yaml)?;
        assert_eq!(reparsed.as_ref(), &config);
        Ok(())
    }

    #[test]
    fn format_is_detected_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.YML")).ok(),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config")).ok(),
            Some(ConfigFormat::Json)
        );
        let error = ConfigFormat::from_path(Path::new("a.toml")).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
    }

    #[test]
    fn missing_file_reports_not_found() {
        let error = load_logging_config_from_path(
            Some(Path::new("/definitely/not/here.json")),
            &LoggingOverrides::default(),
            &LoggingEnv::default(),
        )
        .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "config_file_not_found"))
        );
    }
}
