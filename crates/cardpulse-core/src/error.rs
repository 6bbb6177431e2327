//! Core error types for cardpulse-core.
//!
//! Every failure a run can hit is classified once into one of these
//! variants; the CLI entry point alone decides what becomes an exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cardpulse-core.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Missing or invalid configuration. Raised before any network call.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed or missing user input (explicit report dates).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The work-tracking board could not be reached, rejected the request,
    /// or returned a payload we could not read.
    #[error("Source unavailable ({context}): {message}")]
    SourceUnavailable { context: String, message: String },

    /// The chat endpoint did not accept the digest.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Writing the bulk export failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl DigestError {
    pub(crate) fn source_unavailable(context: impl Into<String>, message: impl ToString) -> Self {
        DigestError::SourceUnavailable {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether this failure may be recovered by skipping a single item.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, DigestError::SourceUnavailable { .. })
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration at {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<csv::Error> for DigestError {
    fn from(err: csv::Error) -> Self {
        DigestError::Export(err.to_string())
    }
}

impl From<std::io::Error> for DigestError {
    fn from(err: std::io::Error) -> Self {
        DigestError::Export(err.to_string())
    }
}

/// Result type alias for DigestError
pub type Result<T, E = DigestError> = std::result::Result<T, E>;
