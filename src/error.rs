//! Error types for configuration loading.
//!
//! The simulation itself never fails; only reading tuning and level files can.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or validating tuning and level data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON was malformed or did not match the expected shape.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
