//! # condlog-config
//!
//! Logging configuration schema, validation, env overrides, and file loading.
//! This crate depends on `ports` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    ConfigSchemaError, ConsoleConfig, ConsoleType, ContextConfig, DEFAULT_CONSOLE_LEVEL,
    DEFAULT_CONSOLE_TYPE, DEFAULT_CONTEXT_CONDITIONAL_LEVEL, DEFAULT_CONTEXT_LEVEL,
    DEFAULT_CONTEXT_TRIGGER_LEVEL, DEFAULT_FILE_LEVEL, DEFAULT_MAIN_LEVEL, FileConfig,
    LoggingConfig, MainConfig, ValidatedLoggingConfig, parse_logging_config_json,
    parse_logging_config_yaml,
};

pub use env::{EnvParseError, LoggingEnv, apply_env_overrides};
pub use load::{
    ConfigFormat, LoggingOverrides, load_logging_config_from_path,
    load_logging_config_from_sources, load_logging_config_std_env, to_pretty_json,
    to_pretty_yaml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use condlog_ports::ports_crate_version;
    use condlog_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_ports_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
