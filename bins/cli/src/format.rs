//! Output format helpers for CLI commands.

use clap::ValueEnum;

/// Serialization of the printed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}
