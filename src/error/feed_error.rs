//! Unified error type for lanefeed entry points.
//!
//! Only the outer surfaces (config loading, bootstrap, the binary) can fail.
//! Everything behind the pipeline controller degrades instead of erroring.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::source::SourceError;

/// Any error a lanefeed entry point can return.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::Source(err) => err.category(),
            FeedError::Config(_) => ErrorCategory::Configuration,
            FeedError::Io(_) => ErrorCategory::System,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FeedError::Source(err) => err.error_code(),
            FeedError::Config(err) => err.error_code(),
            FeedError::Io(_) => "E_SYS_IO",
        }
    }

    /// Check if retrying the failed operation could help.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Source(err) => err.is_retryable(),
            FeedError::Config(_) => false,
            FeedError::Io(_) => false,
        }
    }
}

/// Type alias for Results using FeedError.
pub type FeedResult<T> = Result<T, FeedError>;
