//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Library error
    #[error("atspi-e2e error: {0}")]
    E2e(#[from] atspi_e2e::E2eError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Feature not compiled in
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create an unsupported feature error
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_library_error() {
        let err: CliError = atspi_e2e::E2eError::backend("bus gone").into();
        assert!(err.to_string().contains("bus gone"));
        assert!(matches!(err, CliError::E2e(_)));
    }

    #[test]
    fn test_io_error() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_unsupported() {
        let err = CliError::unsupported("no backend");
        assert_eq!(err.to_string(), "Unsupported: no backend");
    }
}
