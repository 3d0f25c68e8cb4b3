//! Wiring a validated config into loggers and sinks.

use crate::context::ContextFactory;
use condlog_adapters::{
    ConsoleRenderer, FileSink, FilteredLevelSink, JsonLogger, MultiLevelSink, PlainLevelSink,
    PrettySink, TracingBridge, WriterSink,
};
use condlog_config::{ConsoleType, ValidatedLoggingConfig};
use condlog_ports::{ByteSink, Level, LevelSink, LoggerPort, NopLogger};
use condlog_shared::{ErrorCode, ErrorEnvelope};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Configured loggers.
pub struct Logging {
    main: Arc<dyn LoggerPort>,
    context: ContextFactory,
    min_output_level: Level,
    file_path: Option<PathBuf>,
}

impl Logging {
    /// The main logger. A no-op logger when nothing is enabled.
    #[must_use]
    pub fn main(&self) -> Arc<dyn LoggerPort> {
        Arc::clone(&self.main)
    }

    /// Factory for per-request context sessions.
    #[must_use]
    pub const fn context(&self) -> &ContextFactory {
        &self.context
    }

    /// Lowest level any sink accepts (`disabled` when there is no sink).
    #[must_use]
    pub const fn min_output_level(&self) -> Level {
        self.min_output_level
    }

    /// File the entries are appended to, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// `tracing` layer feeding the main logger.
    #[must_use]
    pub fn tracing_layer(&self) -> TracingBridge {
        TracingBridge::new(self.main())
    }

    /// Route `tracing` events of the whole process to the main logger.
    ///
    /// `RUST_LOG` narrows which events are forwarded. Fails if a global
    /// subscriber is already installed.
    pub fn install_tracing(&self) -> Result<(), ErrorEnvelope> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
        tracing_subscriber::registry()
            .with(filter)
            .with(self.tracing_layer())
            .try_init()
            .map_err(|error| {
                ErrorEnvelope::expected(
                    ErrorCode::new("logging", "tracing_already_installed"),
                    format!("cannot install tracing subscriber: {error}"),
                )
            })
    }
}

impl std::fmt::Debug for Logging {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Logging")
            .field("main_level", &self.main.level())
            .field("context", &self.context)
            .field("min_output_level", &self.min_output_level)
            .field("file_path", &self.file_path)
            .finish()
    }
}

/// Build loggers writing the console output to stdout.
pub fn init_logging(config: &ValidatedLoggingConfig) -> Result<Logging, ErrorEnvelope> {
    init_logging_with_console(config, Arc::new(WriterSink::stdout()))
}

/// Build loggers writing the console output to `console`.
///
/// The file sink is opened (and created with mode `0o600`) when a path is set.
pub fn init_logging_with_console(
    config: &ValidatedLoggingConfig,
    console: Arc<dyn ByteSink>,
) -> Result<Logging, ErrorEnvelope> {
    let mut sinks: Vec<Arc<dyn LevelSink>> = Vec::new();
    let mut min_output_level = Level::Disabled;

    let console_sink: Option<Arc<dyn LevelSink>> = match config.console.kind {
        ConsoleType::Color | ConsoleType::NoColor => {
            let renderer = ConsoleRenderer::from_env(config.console.kind == ConsoleType::NoColor);
            Some(Arc::new(PrettySink::new(renderer, console)))
        },
        ConsoleType::Json => Some(Arc::new(PlainLevelSink::new(console))),
        ConsoleType::Disable => None,
    };
    if let Some(sink) = console_sink {
        sinks.push(Arc::new(FilteredLevelSink::new(sink, config.console.level)));
        min_output_level = min_output_level.min(config.console.level);
    }

    if let Some(path) = &config.file.path {
        let file = FileSink::open(path).map_err(|error| {
            ErrorEnvelope::from(error)
                .with_metadata("path", path.to_string_lossy().to_string())
                .with_metadata("operation", "open_log_file")
        })?;
        let file: Arc<dyn LevelSink> = Arc::new(PlainLevelSink::new(Arc::new(file)));
        sinks.push(Arc::new(FilteredLevelSink::new(file, config.file.level)));
        min_output_level = min_output_level.min(config.file.level);
    }

    let has_sinks = !sinks.is_empty();
    let output: Arc<dyn LevelSink> = Arc::new(MultiLevelSink::new(sinks));

    let main_level = min_output_level.max(config.main.level);
    let main: Arc<dyn LoggerPort> = if has_sinks && main_level < Level::Disabled {
        Arc::new(JsonLogger::new(Arc::clone(&output)).with_min_level(main_level))
    } else {
        Arc::new(NopLogger)
    };

    let context_level = min_output_level.max(config.context.level);
    let context = if has_sinks && context_level < Level::Disabled {
        ContextFactory::new(
            output,
            context_level,
            config.context.conditional_level,
            config.context.trigger_level,
        )
    } else {
        ContextFactory::disabled()
    };

    Ok(Logging {
        main,
        context,
        min_output_level,
        file_path: config.file.path.clone(),
    })
}
