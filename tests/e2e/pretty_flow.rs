//! `condlog pretty` E2E tests.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn pretty(args: &[&str], input: &str, env: &[(&str, &str)]) -> std::io::Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_condlog"))
        .arg("pretty")
        .args(args)
        .env_remove("NO_COLOR")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    child.wait_with_output()
}

#[test]
fn malformed_lines_are_reported_and_skipped() -> std::io::Result<()> {
    let input = concat!(
        "{\"level\":\"info\",\"time\":\"t\",\"message\":\"one\"}\n",
        "this is not json\n",
        "\n",
        "{\"level\":\"error\",\"time\":\"t\",\"message\":\"two\",\"error\":\"disk\"}\n",
    );
    let output = pretty(&["--no-color"], input, &[])?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "t INF one\nt ERR two error=disk\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: cannot decode event: "));
    assert!(stderr.ends_with("\n\nthis is not json\n"));
    Ok(())
}

#[test]
fn colour_is_on_by_default_and_no_color_env_turns_it_off() -> std::io::Result<()> {
    let input = "{\"level\":\"info\",\"time\":\"t\",\"message\":\"hi\"}\n";

    let colored = pretty(&[], input, &[])?;
    assert_eq!(
        String::from_utf8_lossy(&colored.stdout),
        "\x1b[90mt\x1b[0m \x1b[32mINF\x1b[0m hi\n"
    );

    let plain = pretty(&[], input, &[("NO_COLOR", "1")])?;
    assert_eq!(String::from_utf8_lossy(&plain.stdout), "t INF hi\n");
    Ok(())
}
