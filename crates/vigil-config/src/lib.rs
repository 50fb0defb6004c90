//! Configuration for the vigil retrieval engine.
//!
//! The orchestration layer supplies a small set of knobs: where the index
//! lives, how documents are chunked, how many results retrieval returns,
//! an optional recency window, and the context budget handed to the
//! language-model collaborator. Configuration is a TOML file:
//!
//! ```toml
//! index_dir = "/var/lib/vigil/advisories"
//! chunk_size_words = 100
//! result_limit = 5
//! recent_days = 7
//! context_window = 2048
//! context_fields = ["id", "description", "severity"]
//! ```
//!
//! Every setting except `index_dir` has a default. `result_limit = 0` means
//! unlimited retrieval.

#![warn(missing_docs)]

mod error;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// Default chunk size in words.
const DEFAULT_CHUNK_SIZE_WORDS: usize = 100;

/// Default number of retrieved documents.
const DEFAULT_RESULT_LIMIT: usize = 5;

/// Default context window handed to the language model.
const DEFAULT_CONTEXT_WINDOW: usize = 2048;

/// Serde default for [`Config::chunk_size_words`].
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE_WORDS
}

/// Serde default for [`Config::result_limit`].
fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

/// Serde default for [`Config::context_window`].
fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

/// Engine configuration supplied by the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the on-disk index.
    pub index_dir: PathBuf,

    /// Words per chunk for oversized document text.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_words: usize,

    /// Maximum number of retrieved documents; `0` means unlimited.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Restrict recency-aware retrieval to the last N days.
    #[serde(default)]
    pub recent_days: Option<i64>,

    /// Context budget (in model tokens) for the language-model collaborator.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Stored fields rendered into the context, in order.
    #[serde(default)]
    pub context_fields: Vec<String>,
}

impl Config {
    /// Creates a configuration with defaults for everything but `index_dir`.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            chunk_size_words: DEFAULT_CHUNK_SIZE_WORDS,
            result_limit: DEFAULT_RESULT_LIMIT,
            recent_days: None,
            context_window: DEFAULT_CONTEXT_WINDOW,
            context_fields: Vec::new(),
        }
    }

    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("index_dir must not be empty".into()));
        }
        if self.chunk_size_words == 0 {
            return Err(ConfigError::Invalid(
                "chunk_size_words must be at least 1".into(),
            ));
        }
        if self.context_window == 0 {
            return Err(ConfigError::Invalid(
                "context_window must be at least 1".into(),
            ));
        }
        if let Some(days) = self.recent_days
            && days < 1
        {
            return Err(ConfigError::Invalid(
                "recent_days must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    /// Returns the retrieval limit, mapping `0` to unlimited.
    pub fn result_limit(&self) -> Option<usize> {
        if self.result_limit == 0 {
            None
        } else {
            Some(self.result_limit)
        }
    }
}
