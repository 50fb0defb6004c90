//! Error types for the vigil-rag crate.

use thiserror::Error;
use vigil_config::ConfigError;
use vigil_index::{IndexError, QueryError};

/// Errors that can occur while assembling context or answering questions.
#[derive(Debug, Error)]
pub enum RagError {
    /// The underlying index failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A query could not be built.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The language-model collaborator failed.
    #[error("language model error: {0}")]
    Model(String),
}
