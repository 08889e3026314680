//! Error types for the import engine.

use preload_store::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// A record that cannot become an entity at all.
///
/// Problems with a single attribute never produce this error; the attribute
/// is dropped instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no object id")]
    MissingObjectId,
}

/// Errors that abort a load or appear in the failed collection of an
/// [`crate::Outcome`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input file could not be read.
    #[error("cannot load file {}: {source}", .path.display())]
    CannotLoadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input file is not JSON of the expected shape.
    #[error("invalid JSON in {}: {reason}", .path.display())]
    InvalidJson { path: PathBuf, reason: String },

    /// The input directory could not be enumerated.
    #[error("cannot read directory {}: {source}", .path.display())]
    CannotReadDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A relation batch name is not `<prefix>:<key>:<Owner>:<Target>`.
    #[error("invalid relation batch name {0:?}: expected _Join:<relationKey>:<OwnerClass>:<TargetClass>")]
    InvalidRelationKey(String),

    /// One record of an entity class failed to decode.
    #[error("record {index} of {class_name}: {source}")]
    Decode {
        class_name: String,
        index: usize,
        source: DecodeError,
    },

    /// A relation edge lacks one of its endpoint ids.
    #[error("relation edge is missing {field}")]
    MissingRelationField { field: &'static str },

    /// The store rejected a read or write.
    #[error("store error on {context}: {source}")]
    Storage {
        context: String,
        source: StorageError,
    },

    /// An import task panicked before producing a result.
    #[error("import task for {context} failed: {reason}")]
    TaskFailed { context: String, reason: String },
}

impl ImportError {
    /// True for errors that stop a load before any import starts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImportError::CannotLoadFile { .. }
                | ImportError::InvalidJson { .. }
                | ImportError::CannotReadDirectory { .. }
        )
    }

    pub(crate) fn storage(context: impl Into<String>, source: StorageError) -> Self {
        ImportError::Storage {
            context: context.into(),
            source,
        }
    }
}
