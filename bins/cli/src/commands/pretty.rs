//! Pretty command handler.

use crate::CliOutput;
use crate::error::CliError;
use condlog_facade::pretty_log;
use std::io;

/// Stream stdin JSON lines to stdout as console lines.
pub fn run_pretty(no_color: bool) -> Result<CliOutput, CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    pretty_log(no_color, stdin.lock(), &mut stdout, &mut stderr)?;
    Ok(CliOutput::default())
}
