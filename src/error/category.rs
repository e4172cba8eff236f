//! Error category classification.
//!
//! Categories give log lines and callers a coarse handle on an error
//! without matching on every variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS or timeout problems.
    /// Generally transient and retryable.
    Network,

    /// Upstream failures (HTTP 5xx, rate limiting).
    /// Generally transient and retryable after a delay.
    Server,

    /// Responses we could not make sense of, or requests we built wrong.
    /// Not retryable.
    Client,

    /// Filesystem, OS and local client failures.
    System,

    /// Missing or invalid configuration.
    /// Not retryable until the configuration is corrected.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the image source is reachable",
            ErrorCategory::Server => "The image source is struggling; the feed recycles until it recovers",
            ErrorCategory::Client => "The image source returned data in an unexpected shape",
            ErrorCategory::System => "Check file permissions and paths",
            ErrorCategory::Configuration => "Check your configuration file and environment",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
