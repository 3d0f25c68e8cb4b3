//! Effective config E2E tests: file, env, and flags together.

use std::error::Error;
use std::fs;
use std::process::{Command, Output};

const CONDLOG_VARS: [&str; 8] = [
    "CONDLOG_CONSOLE_TYPE",
    "CONDLOG_CONSOLE_LEVEL",
    "CONDLOG_FILE_PATH",
    "CONDLOG_FILE_LEVEL",
    "CONDLOG_MAIN_LEVEL",
    "CONDLOG_CONTEXT_LEVEL",
    "CONDLOG_CONTEXT_CONDITIONAL_LEVEL",
    "CONDLOG_CONTEXT_TRIGGER_LEVEL",
];

fn run(args: &[&str], env: &[(&str, &str)]) -> std::io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_condlog"));
    for key in CONDLOG_VARS {
        command.env_remove(key);
    }
    command.args(args).envs(env.iter().copied());
    command.output()
}

#[test]
fn file_env_and_flags_merge_in_precedence_order() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("logging.yaml");
    fs::write(
        &path,
        "logging:\n  console:\n    type: json\n    level: info\n  main:\n    level: warn\n  context:\n    triggerLevel: warn\n",
    )?;
    let path = path.to_string_lossy().to_string();

    let output = run(
        &["config", "--config", &path, "-l", "error"],
        &[("CONDLOG_MAIN_LEVEL", "debug"), ("CONDLOG_CONSOLE_LEVEL", "trace")],
    )?;
    assert!(
        output.status.success(),
        "config failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let logging = &value["logging"];
    assert_eq!(logging["console"]["type"], "json");
    assert_eq!(logging["console"]["level"], "trace");
    assert_eq!(logging["main"]["level"], "error");
    assert_eq!(logging["context"]["triggerLevel"], "warn");
    assert_eq!(logging["context"]["conditionalLevel"], "debug");
    Ok(())
}

#[test]
fn printed_config_is_accepted_as_input() -> Result<(), Box<dyn Error>> {
    let first = run(
        &[
            "config",
            "--logging.console.type",
            "nocolor",
            "--logging.context.level",
            "disabled",
            "--logging.file.path",
            "/var/log/app.log",
        ],
        &[],
    )?;
    assert!(first.status.success());

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("effective.json");
    fs::write(&path, &first.stdout)?;
    let path = path.to_string_lossy().to_string();

    let second = run(&["config", "--config", &path], &[])?;
    assert!(second.status.success());
    assert_eq!(first.stdout, second.stdout);
    Ok(())
}

#[test]
fn yaml_output_matches_the_file_layout() -> Result<(), Box<dyn Error>> {
    let output = run(&["config", "--format", "yaml"], &[])?;
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("logging:\n"));
    assert!(text.contains("conditionalLevel: debug"));
    Ok(())
}

#[test]
fn errors_map_to_exit_codes() -> Result<(), Box<dyn Error>> {
    let missing = run(&["config", "--config", "/definitely/not/here.json"], &[])?;
    assert_eq!(missing.status.code(), Some(3));

    let bad_env = run(&["config"], &[("CONDLOG_FILE_LEVEL", "loud")])?;
    assert_eq!(bad_env.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&bad_env.stderr).contains("CONDLOG_FILE_LEVEL"));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"logging\": {\"console\": {\"colour\": true}}}")?;
    let path = path.to_string_lossy().to_string();
    let unknown_field = run(&["config", "--config", &path], &[])?;
    assert_eq!(unknown_field.status.code(), Some(2));

    let bad_flag = run(&["config", "--logging.console.type", "fancy"], &[])?;
    assert_eq!(bad_flag.status.code(), Some(2));
    Ok(())
}
