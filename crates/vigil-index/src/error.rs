//! Error types for the vigil-index crate.

use std::{io, path::Path, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when defining schemas, writing documents, or
/// searching an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The schema definition itself is malformed.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// An existing on-disk index is incompatible with the requested schema.
    #[error("schema mismatch at {path}: {reason}")]
    SchemaMismatch {
        /// Path to the index directory.
        path: PathBuf,
        /// Why the schemas cannot be reconciled.
        reason: String,
    },

    /// A document violates the schema at upsert time.
    #[error("field {field}: {reason}")]
    Field {
        /// Name of the offending field.
        field: String,
        /// Why the field was rejected.
        reason: String,
    },

    /// A query references a field the schema does not define.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A query is structurally valid but contradicts the schema.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A builder or helper was given a malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Another writer session is already open against this index.
    #[error("another writer session is open for this index")]
    WriterBusy,

    /// A committed or aborted writer session was reused.
    #[error("writer session is closed")]
    SessionClosed,

    /// Commit hit a storage fault; the index keeps its last committed state.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// The index storage could not be opened, created, or read.
    #[error("index storage unavailable at {path}: {message}")]
    Storage {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    /// Creates a `Schema` error.
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates a `Field` error.
    pub(crate) fn field(field: &str, reason: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `Storage` error from a path and an underlying message.
    pub(crate) fn storage(path: &Path, message: impl ToString) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
