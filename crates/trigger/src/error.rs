//! Trigger buffer errors.

use condlog_shared::{ErrorCode, ErrorEnvelope};
use std::io;

/// Failure of a trigger buffer operation.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The session was closed and its storage returned to the pool.
    #[error("invalid writer")]
    InvalidWriter,
    /// The downstream sink rejected a write.
    #[error(transparent)]
    Downstream(#[from] io::Error),
    /// An entry headed for the buffer was empty, unterminated, or contained
    /// an embedded newline.
    #[error("buffered entry must end with a single newline and contain no other newline")]
    UnterminatedEntry,
    /// The buffer could not be split back into records.
    #[error("corrupt buffered record at byte {offset}")]
    CorruptRecord {
        /// Byte offset of the record that failed to decode.
        offset: usize,
    },
}

impl TriggerError {
    /// Returns true for the use-after-close error.
    #[must_use]
    pub const fn is_invalid_writer(&self) -> bool {
        matches!(self, Self::InvalidWriter)
    }
}

impl From<TriggerError> for ErrorEnvelope {
    fn from(error: TriggerError) -> Self {
        match error {
            TriggerError::InvalidWriter => Self::expected(
                ErrorCode::new("trigger", "invalid_writer"),
                "write or trigger on a closed session",
            ),
            TriggerError::Downstream(io_error) => Self::from(io_error),
            TriggerError::UnterminatedEntry => Self::expected(
                ErrorCode::new("trigger", "unterminated_entry"),
                TriggerError::UnterminatedEntry.to_string(),
            ),
            TriggerError::CorruptRecord { offset } => Self::invariant(
                ErrorCode::new("trigger", "corrupt_record"),
                format!("corrupt buffered record at byte {offset}"),
            )
            .with_metadata("offset", offset.to_string()),
        }
    }
}

impl From<TriggerError> for io::Error {
    fn from(error: TriggerError) -> Self {
        match error {
            TriggerError::Downstream(io_error) => io_error,
            TriggerError::UnterminatedEntry => Self::new(io::ErrorKind::InvalidInput, error),
            other => Self::other(other),
        }
    }
}
