//! Error types for the OS-specific lookup crate.
//!
//! Lookup failures have their own [`LookupError`] in the plugin layer; this
//! module wraps them together with the errors of the surrounding plumbing
//! (loading facts and term files, configuration).

use std::path::PathBuf;
use thiserror::Error;

use crate::plugins::lookup::LookupError;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A lookup plugin failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Facts were not shaped as a mapping.
    #[error("Invalid facts: {0}")]
    FactsFormat(String),

    /// Failed to read a file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a facts, terms or config file.
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// Path being parsed
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error for a file.
    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from an invalid lookup invocation.
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, Self::Lookup(LookupError::InvalidArguments(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_is_transparent() {
        let err: Error =
            LookupError::InvalidArguments("with_os_specific expects a list".into()).into();
        assert_eq!(
            err.to_string(),
            "Invalid lookup arguments: with_os_specific expects a list"
        );
        assert!(err.is_invalid_arguments());
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("facts.yml", "unexpected end of stream");
        assert_eq!(
            err.to_string(),
            "Failed to parse 'facts.yml': unexpected end of stream"
        );
        assert!(!err.is_invalid_arguments());
    }
}
