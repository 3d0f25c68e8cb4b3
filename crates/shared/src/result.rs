//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers for results carrying an [`ErrorEnvelope`].
pub trait ResultExt<T> {
    /// Attach a metadata entry to the error, leaving success untouched.
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ErrorEnvelope>,
{
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.into().with_metadata(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::io;

    #[test]
    fn with_metadata_decorates_errors() {
        let value: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let error = value.with_metadata("path", "/var/log/app.log").err();

        let Some(error) = error else {
            unreachable!("error expected");
        };
        assert_eq!(error.code, ErrorCode::not_found());
        assert_eq!(
            error.metadata.get("path").map(String::as_str),
            Some("/var/log/app.log")
        );
    }

    #[test]
    fn with_metadata_keeps_success() {
        let value: Result<u8> = Ok(7);
        assert!(matches!(value.with_metadata("path", "x"), Ok(7)));
    }
}
