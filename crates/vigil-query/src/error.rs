//! Error types for query construction and parsing.

use thiserror::Error;

/// Errors produced by query builders and the text-query parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A boolean combination was given no clauses.
    #[error("a boolean combination requires at least one clause")]
    Empty,

    /// The text-query parser rejected the input.
    #[error("query syntax error at byte {position}: {message}")]
    Syntax {
        /// Human-readable reason.
        message: String,
        /// Byte offset into the input where the offending token starts.
        position: usize,
    },
}

impl QueryError {
    /// Creates a syntax error at the given byte offset.
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }
}
