//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A blocking store task panicked or the connection lock was poisoned.
    #[error("store task failed: {0}")]
    Task(String),
}

impl From<preload_types::Error> for StorageError {
    fn from(err: preload_types::Error) -> Self {
        StorageError::InvalidData(err.to_string())
    }
}
