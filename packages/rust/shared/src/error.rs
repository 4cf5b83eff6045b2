//! Error types for datafetch.
//!
//! Library crates use [`DataFetchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all datafetch operations.
#[derive(Debug, thiserror::Error)]
pub enum DataFetchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error (transport failure or non-success status).
    #[error("network error: {0}")]
    Network(String),

    /// HTML, XML, or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (row shape mismatch, invalid range, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Table export error (CSV or JSON serialization).
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DataFetchError>;

impl DataFetchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DataFetchError::config("start_year after end_year");
        assert_eq!(err.to_string(), "config error: start_year after end_year");

        let err = DataFetchError::validation("row has 5 cells, expected 4");
        assert!(err.to_string().contains("5 cells"));

        let err = DataFetchError::Network("https://example.com: HTTP 404 Not Found".into());
        assert!(err.to_string().starts_with("network error:"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DataFetchError::io("/tmp/out.csv", source);
        assert!(err.to_string().contains("out.csv"));
    }
}
