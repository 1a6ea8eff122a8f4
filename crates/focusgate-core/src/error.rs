//! Core error types for focusgate-core.
//!
//! There is no fatal error class: every failure either surfaces as an
//! error response at the dispatcher boundary or degrades to a log line.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule-engine-related errors
    #[error("Rule engine error: {0}")]
    Rules(#[from] RuleEngineError),

    /// Host facility errors (alarms, notifications)
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value is not valid JSON
    #[error("Corrupt value under key '{key}': {message}")]
    CorruptValue { key: String, message: String },

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Rule-engine-specific errors.
#[derive(Error, Debug)]
pub enum RuleEngineError {
    /// The engine rejected a rule set replacement
    #[error("Rule update rejected: {0}")]
    UpdateRejected(String),

    /// Querying the active rule set failed
    #[error("Rule query failed: {0}")]
    QueryFailed(String),
}

/// Errors from host facilities (alarm scheduler, notifier).
#[derive(Error, Debug)]
pub enum HostError {
    /// Alarm scheduling or clearing failed
    #[error("Alarm error: {0}")]
    Alarm(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Domain string failed syntactic normalization
    #[error("invalid domain")]
    InvalidDomain,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
