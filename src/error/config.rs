//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An environment override could not be parsed.
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    /// A field holds a value the pipeline cannot work with.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "E_CFG_IO",
            ConfigError::Parse { .. } => "E_CFG_PARSE",
            ConfigError::InvalidEnv { .. } => "E_CFG_ENV",
            ConfigError::Invalid { .. } => "E_CFG_INVALID",
        }
    }
}
