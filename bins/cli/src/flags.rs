//! `--logging.*` flags shared with the config file layout.

use clap::Args;
use condlog_config::{ConsoleType, LoggingOverrides};
use condlog_ports::Level;
use std::path::PathBuf;

/// Logging flags. Every flag overrides the file and the environment.
#[derive(Debug, Clone, Default, Args)]
pub struct LoggingArgs {
    /// Console output: color, nocolor, json, or disable.
    #[arg(long = "logging.console.type", value_name = "TYPE")]
    pub console_type: Option<ConsoleType>,
    /// Console level: trace, debug, info, warn, or error.
    #[arg(long = "logging.console.level", value_name = "LEVEL")]
    pub console_level: Option<Level>,
    /// Append entries to this file.
    #[arg(long = "logging.file.path", value_name = "PATH")]
    pub file_path: Option<PathBuf>,
    /// File level: trace, debug, info, warn, or error.
    #[arg(long = "logging.file.level", value_name = "LEVEL")]
    pub file_level: Option<Level>,
    /// Main logger level: trace, debug, info, warn, error, or disabled.
    #[arg(short = 'l', long = "logging.main.level", value_name = "LEVEL")]
    pub main_level: Option<Level>,
    /// Context logger level: trace, debug, info, warn, error, or disabled.
    #[arg(long = "logging.context.level", value_name = "LEVEL")]
    pub context_level: Option<Level>,
    /// Hold context entries at this level and below until triggered.
    #[arg(long = "logging.context.conditional", value_name = "LEVEL")]
    pub context_conditional_level: Option<Level>,
    /// A context entry at this level or above triggers.
    #[arg(long = "logging.context.trigger", value_name = "LEVEL")]
    pub context_trigger_level: Option<Level>,
}

impl LoggingArgs {
    pub fn to_overrides(&self) -> LoggingOverrides {
        LoggingOverrides {
            console_type: self.console_type,
            console_level: self.console_level,
            file_path: self.file_path.clone(),
            file_level: self.file_level,
            main_level: self.main_level,
            context_level: self.context_level,
            context_conditional_level: self.context_conditional_level,
            context_trigger_level: self.context_trigger_level,
        }
    }
}
