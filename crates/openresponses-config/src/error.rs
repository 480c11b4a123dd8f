//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a transport configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid for its format
    #[error("failed to parse {format} config file {path}: {message}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Format the parser expected
        format: &'static str,
        /// Parser diagnostic
        message: String,
    },

    /// Strict validation rejected the document
    #[error("invalid transport config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    /// Stable machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "config_io",
            Self::Parse { .. } => "config_parse",
            Self::Invalid(_) => "config_invalid",
        }
    }
}
