use condlog_shared::{ErrorEnvelope, ErrorKind};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitCode {
    #[default]
    Ok = 0,
    InvalidInput = 2,
    Io = 3,
    Internal = 1,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Envelope(ErrorEnvelope),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::Io,
            Self::Envelope(error) => envelope_exit_code(error),
        }
    }
}

/// Reading files and streams maps to `Io`; other expected failures are bad
/// input.
fn envelope_exit_code(error: &ErrorEnvelope) -> ExitCode {
    let code = error.code.code();
    let io_failure = (error.code.namespace() == "core"
        && matches!(code, "io" | "not_found" | "permission_denied"))
        || code.starts_with("config_file_");
    if io_failure {
        return ExitCode::Io;
    }
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Invariant | ErrorKind::Unexpected => ExitCode::Internal,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(formatter, "io error: {error}"),
            Self::Envelope(error) => {
                write!(formatter, "{} ({})", error.message, error.code)?;
                for (key, value) in &error.metadata {
                    write!(formatter, " {key}={value}")?;
                }
                Ok(())
            },
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<ErrorEnvelope> for CliError {
    fn from(error: ErrorEnvelope) -> Self {
        Self::Envelope(error)
    }
}
