//! Core error types for dailyquote-core.
//!
//! Every fallible operation in the library returns [`CoreError`] or one of
//! its component errors. Nothing here is retried automatically; retrying is
//! the caller's job on the next activation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dailyquote-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The quote dataset could not be fetched or parsed.
    #[error("Dataset error: {0}")]
    Load(#[from] LoadError),

    /// The persistence layer failed or holds unreadable state.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No quote with the given id exists in the collection.
    #[error("Quote with id {id} not found")]
    NotFound { id: i64 },

    /// Persisted state contradicts the unlock invariants.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Dataset loading errors. State is left uninitialized when these occur.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to read a local dataset file
    #[error("Failed to read dataset at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network failure while fetching a remote dataset
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote dataset answered with a non-success status
    #[error("Dataset request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Dataset body is not valid JSON of the expected shape
    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// Dataset parsed but breaks ordering or uniqueness rules
    #[error("Malformed dataset: {0}")]
    Malformed(String),

    /// Dataset source string could not be understood
    #[error("Invalid dataset source '{0}'")]
    InvalidSource(String),
}

/// Persistence-layer errors. No partial state is committed when these occur.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// Store refuses writes (disabled, quota exceeded, read-only)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {message}")]
    Encode { key: String, message: String },

    /// Stored value could not be decoded
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory error: {0}")]
    DataDir(#[from] std::io::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => match e.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    PersistenceError::Locked
                }
                rusqlite::ErrorCode::DiskFull
                | rusqlite::ErrorCode::ReadOnly
                | rusqlite::ErrorCode::CannotOpen => PersistenceError::Unavailable(err.to_string()),
                _ => PersistenceError::QueryFailed(err.to_string()),
            },
            _ => PersistenceError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_id() {
        let err = CoreError::NotFound { id: 7 };
        assert_eq!(err.to_string(), "Quote with id 7 not found");
    }

    #[test]
    fn load_error_converts_into_core_error() {
        let err: CoreError = LoadError::Malformed("ids out of order".into()).into();
        assert!(matches!(err, CoreError::Load(LoadError::Malformed(_))));
        assert!(err.to_string().contains("ids out of order"));
    }

    #[test]
    fn non_sqlite_failures_map_to_query_failed() {
        let err = PersistenceError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, PersistenceError::QueryFailed(_)));
    }
}
