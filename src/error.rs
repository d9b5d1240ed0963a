//! Error types for table-json-export
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The three export-stage kinds (`Source`, `Destination`, `Serialization`)
//! are kept distinct so the failing stage survives all the way to the user.

use std::path::Path;
use thiserror::Error;

/// The main error type for table-json-export
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Export Stage Errors
    // ============================================================================
    #[error("Source error: {message}")]
    Source { message: String },

    #[error("Destination error ({path}): {message}")]
    Destination { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Export cancelled after {records_written} records")]
    Cancelled { records_written: usize },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Configuration or argument validation
    Config,
    /// Connection, query or fetch against the data source
    Source,
    /// Creating, writing or closing the output file
    Destination,
    /// Mapping a value to JSON
    Serialization,
    /// Export stopped by a cancellation request
    Cancelled,
}

impl std::fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorStage::Config => write!(f, "config"),
            ErrorStage::Source => write!(f, "source"),
            ErrorStage::Destination => write!(f, "destination"),
            ErrorStage::Serialization => write!(f, "serialization"),
            ErrorStage::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a source error
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a destination error for the given path
    pub fn destination(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Destination {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Stage of the export this error belongs to
    pub fn stage(&self) -> ErrorStage {
        match self {
            Error::Source { .. } => ErrorStage::Source,
            Error::Destination { .. } | Error::Io(_) => ErrorStage::Destination,
            Error::Serialization { .. } => ErrorStage::Serialization,
            Error::Cancelled { .. } => ErrorStage::Cancelled,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::Other(_) => ErrorStage::Config,
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::data_source(err.to_string())
    }
}

/// Result type alias for table-json-export
pub type Result<T> = std::result::Result<T, Error>;
