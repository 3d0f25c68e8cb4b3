//! End-to-end behavior of configured context sessions.

use condlog_config::{ConsoleType, LoggingConfig};
use condlog_facade::{Logging, init_logging_with_console};
use condlog_ports::{ByteSink, Level};
use serde_json::Value;
use std::error::Error;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct SharedOutput {
    bytes: Mutex<Vec<u8>>,
}

impl SharedOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().expect("output lock")).into_owned()
    }

    /// Console lines without their leading `HH:MM` column.
    fn lines_without_time(&self) -> Vec<String> {
        self.text()
            .lines()
            .map(|line| line.split_once(' ').map_or(line, |(_, rest)| rest).to_owned())
            .collect()
    }
}

impl ByteSink for SharedOutput {
    fn write_entry(&self, entry: &[u8]) -> io::Result<()> {
        self.bytes.lock().expect("output lock").extend_from_slice(entry);
        Ok(())
    }
}

fn console_config(configure: impl FnOnce(&mut LoggingConfig)) -> LoggingConfig {
    let mut config = LoggingConfig::default();
    config.console.kind = ConsoleType::NoColor;
    config.console.level = Level::Debug;
    config.main.level = Level::Disabled;
    config.context.level = Level::Debug;
    config.context.conditional_level = Level::Debug;
    config.context.trigger_level = Level::Error;
    configure(&mut config);
    config
}

fn init(config: LoggingConfig) -> Result<(Logging, Arc<SharedOutput>), Box<dyn Error>> {
    let output = Arc::new(SharedOutput::default());
    let logging = init_logging_with_console(&config.validate_and_normalize()?, output.clone())?;
    Ok((logging, output))
}

fn run_request(logging: &Logging) {
    let session = logging.context().open();
    let logger = session.logger();
    logger.debug("no", None);
    logger.info("yes1", None);
    logger.error("yes2", None);
    session.close();
}

#[test]
fn held_debug_entry_is_flushed_before_the_error() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|_| {}))?;
    run_request(&logging);
    assert_eq!(
        output.lines_without_time(),
        vec!["INF yes1", "DBG no", "ERR yes2"]
    );
    Ok(())
}

#[test]
fn console_level_raises_the_context_level() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|config| {
        config.console.level = Level::Info;
    }))?;
    run_request(&logging);
    assert_eq!(output.lines_without_time(), vec!["INF yes1", "ERR yes2"]);
    Ok(())
}

#[test]
fn context_level_drops_debug_entries() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|config| {
        config.context.level = Level::Info;
    }))?;
    run_request(&logging);
    assert_eq!(output.lines_without_time(), vec!["INF yes1", "ERR yes2"]);
    Ok(())
}

#[test]
fn equal_conditional_and_trigger_levels_pass_everything_through() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|config| {
        config.context.trigger_level = Level::Debug;
    }))?;
    run_request(&logging);
    assert_eq!(
        output.lines_without_time(),
        vec!["DBG no", "INF yes1", "ERR yes2"]
    );
    Ok(())
}

#[test]
fn untriggered_request_writes_only_pass_through_entries() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|_| {}))?;
    let session = logging.context().open();
    session.logger().debug("hidden", None);
    session.logger().warn("visible", None);
    drop(session);
    assert_eq!(output.lines_without_time(), vec!["WRN visible"]);
    Ok(())
}

#[test]
fn panic_inside_scope_flushes_held_entries() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|_| {}))?;
    let session = logging.context().open();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        session.scope(|session| {
            session.logger().debug("context before crash", None);
            panic::resume_unwind(Box::new("crash"))
        })
    }));

    assert!(outcome.is_err());
    assert_eq!(output.lines_without_time(), vec!["DBG context before crash"]);
    Ok(())
}

#[test]
fn sessions_are_independent() -> Result<(), Box<dyn Error>> {
    let (logging, output) = init(console_config(|_| {}))?;
    let quiet = logging.context().open();
    let failing = logging.context().open();

    quiet.logger().debug("quiet request", None);
    failing.logger().debug("failing request", None);
    failing.logger().error("failed", None);
    quiet.close();
    failing.close();

    assert_eq!(
        output.lines_without_time(),
        vec!["DBG failing request", "ERR failed"]
    );
    Ok(())
}

#[test]
fn json_console_and_file_receive_raw_entries() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.log");
    let (logging, output) = init(console_config(|config| {
        config.console.kind = ConsoleType::Json;
        config.console.level = Level::Warn;
        config.file.path = Some(path.clone());
        config.file.level = Level::Debug;
        config.main.level = Level::Info;
    }))?;

    logging.main().info("started", None);
    logging.main().warn("degraded", None);
    drop(logging);

    let console: Vec<Value> = output
        .text()
        .lines()
        .map(serde_json::from_str::<Value>)
        .collect::<Result<_, _>>()?;
    assert_eq!(console.len(), 1);
    assert_eq!(console[0]["message"], "degraded");

    let file = std::fs::read_to_string(&path)?;
    let messages: Vec<String> = file
        .lines()
        .map(|line| {
            serde_json::from_str::<Value>(line)
                .map(|value| value["message"].as_str().unwrap_or_default().to_owned())
        })
        .collect::<Result<_, _>>()?;
    assert_eq!(messages, vec!["started", "degraded"]);
    Ok(())
}
