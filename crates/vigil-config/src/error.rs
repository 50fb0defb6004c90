//! Error types for configuration loading and validation.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file is not valid TOML for the expected shape.
    #[error("failed to parse config at {path}: {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Parser error message.
        message: String,
    },

    /// The configuration parsed but carries an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
