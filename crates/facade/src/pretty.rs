//! Pretty-printing a stream of JSON log lines.

use condlog_adapters::ConsoleRenderer;
use condlog_shared::ErrorEnvelope;
use std::io::{BufRead, Write};

/// Read JSON lines from `input` and write console lines to `output`.
///
/// Empty lines are skipped. A line that cannot be rendered is reported on
/// `diagnostics` followed by the raw line, and reading continues. Failing to
/// read the input or write the output stops with an error.
pub fn pretty_log(
    no_color: bool,
    input: impl BufRead,
    output: &mut impl Write,
    diagnostics: &mut impl Write,
) -> Result<(), ErrorEnvelope> {
    let renderer = ConsoleRenderer::from_env(no_color);

    for line in input.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }

        match renderer.render(&line) {
            Ok(rendered) => output.write_all(rendered.as_bytes())?,
            Err(error) => {
                write!(diagnostics, "error: {error}\n\n")?;
                diagnostics.write_all(&line)?;
                diagnostics.write_all(b"\n")?;
            },
        }
    }

    output.flush()?;
    Ok(())
}
