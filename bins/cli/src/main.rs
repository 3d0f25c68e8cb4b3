//! CLI binary entrypoint.

mod commands;
mod error;
mod flags;
mod format;

use clap::{Parser, Subcommand};
use commands::{run_config, run_pretty};
use error::{CliError, ExitCode};
use flags::LoggingArgs;
use format::OutputFormat;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "condlog",
    version,
    about = "Conditional logging tools",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read JSON log lines from stdin and print them for humans.
    Pretty {
        /// Do not emit colour escape sequences.
        #[arg(long)]
        no_color: bool,
    },
    /// Print the effective logging config (defaults < file < env < flags).
    Config {
        /// Config file (JSON, or YAML with a .yaml/.yml extension).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[command(flatten)]
        logging: LoggingArgs,
    },
}

#[derive(Debug, Default)]
pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands) -> Result<CliOutput, CliError> {
    match command {
        Commands::Pretty { no_color } => run_pretty(*no_color),
        Commands::Config {
            config,
            format,
            logging,
        } => run_config(config.as_deref(), &logging.to_overrides(), *format),
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
