//! Error types for prefstage

use crate::block::BlockState;
use crate::value::PreferenceType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for prefstage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for prefstage
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Preference '{key}' is declared as {declared}, got {actual}")]
    InvalidKeyType {
        key: String,
        declared: PreferenceType,
        actual: PreferenceType,
    },

    #[error("Preference key '{0}' is not registered")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Failed to persist '{key}': {reason}")]
    PersistenceFailure { key: String, reason: String },

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse preferences: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Cannot {operation} a configuration block in state {from:?}")]
    InvalidTransition {
        from: BlockState,
        operation: &'static str,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid validation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error came from the backing store rather than from the caller
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Error::PersistenceFailure { .. }
                | Error::FileRead { .. }
                | Error::FileWrite { .. }
                | Error::DirectoryCreate { .. }
                | Error::Serialize(_)
                | Error::Parse(_)
        )
    }

    /// Check if this is a key declaration error (unknown key or wrong type)
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Error::InvalidKeyType { .. } | Error::UnknownKey(_))
    }
}
