//! Error types for libris.
//!
//! This module defines all error types used throughout the libris crate.
//! Absence of a record and duplicate-key conflicts are not errors; they are
//! communicated through return values so callers can branch on them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for libris operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to read a collection file.
    #[error("failed to read store at {path}: {source}")]
    StoreRead {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a collection file.
    #[error("failed to write store at {path}: {source}")]
    StoreWrite {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A collection file holds malformed JSON.
    #[error("failed to decode store at {path}: {source}")]
    StoreDecode {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// A supplied identifier is not an integer.
    #[error("{field} must be an integer, got '{value}'")]
    InvalidKey {
        /// Name of the identifier field (e.g. "ISBN").
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for libris operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid-key error for an identifier that failed to parse.
    #[must_use]
    pub fn invalid_key(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidKey {
            field,
            value: value.into(),
        }
    }

    /// Check if this error is a retryable input error.
    #[must_use]
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }

    /// Check if this error came from the persistence gateway.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. } | Self::StoreWrite { .. } | Self::StoreDecode { .. }
        )
    }
}
