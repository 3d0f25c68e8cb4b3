//! Config command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputFormat;
use condlog_config::{
    LoggingEnv, LoggingOverrides, ValidatedLoggingConfig, load_logging_config_from_path,
    to_pretty_json, to_pretty_yaml,
};
use std::path::Path;

/// Print the effective logging config.
pub fn run_config(
    path: Option<&Path>,
    overrides: &LoggingOverrides,
    format: OutputFormat,
) -> Result<CliOutput, CliError> {
    let env = LoggingEnv::from_std_env().map_err(condlog_shared::ErrorEnvelope::from)?;
    run_config_with_env(path, overrides, &env, format)
}

pub fn run_config_with_env(
    path: Option<&Path>,
    overrides: &LoggingOverrides,
    env: &LoggingEnv,
    format: OutputFormat,
) -> Result<CliOutput, CliError> {
    let config = load_logging_config_from_path(path, overrides, env)?;
    Ok(CliOutput {
        stdout: render(&config, format)?,
        ..CliOutput::default()
    })
}

fn render(config: &ValidatedLoggingConfig, format: OutputFormat) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => to_pretty_json(config)?,
        OutputFormat::Yaml => to_pretty_yaml(config)?,
    };
    Ok(rendered)
}
