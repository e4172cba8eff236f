//! Item source error types.
//!
//! [`SourceError`] is the failure half of the item source contract: a batch
//! either arrives whole or the request fails with one of these. Failures
//! never reach lane management; the pipeline turns them into its fallback
//! chain. [`PreloadError`] describes a single image that could not be
//! loaded and is only ever logged, since such images are dropped from
//! their batch.

use thiserror::Error;

use super::category::ErrorCategory;

/// A failed batch request.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Connection to the source failed.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// DNS resolution failed.
    #[error("DNS resolution failed for '{host}'")]
    DnsResolutionFailed { host: String },

    /// Request timed out.
    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    /// Non-2xx response.
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// Rate limited by the source.
    #[error("Rate limited by the image source")]
    RateLimited,

    /// Body did not have the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The request was abandoned before completing.
    #[error("Request cancelled")]
    Cancelled,

    /// Anything else.
    #[error("Source error: {message}")]
    Other { message: String },
}

impl SourceError {
    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::ConnectionFailed { .. } => true,
            SourceError::DnsResolutionFailed { .. } => true,
            SourceError::Timeout { .. } => true,
            SourceError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            SourceError::RateLimited => true,
            SourceError::InvalidResponse { .. } => false,
            SourceError::Cancelled => false,
            SourceError::Other { .. } => false,
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SourceError::ConnectionFailed { .. }
            | SourceError::DnsResolutionFailed { .. }
            | SourceError::Timeout { .. } => ErrorCategory::Network,
            SourceError::HttpStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
            SourceError::RateLimited => ErrorCategory::Server,
            SourceError::HttpStatus { .. } | SourceError::InvalidResponse { .. } => {
                ErrorCategory::Client
            }
            SourceError::Cancelled | SourceError::Other { .. } => ErrorCategory::System,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::ConnectionFailed { .. } => "E_SRC_CONN",
            SourceError::DnsResolutionFailed { .. } => "E_SRC_DNS",
            SourceError::Timeout { .. } => "E_SRC_TIMEOUT",
            SourceError::HttpStatus { .. } => "E_SRC_HTTP",
            SourceError::RateLimited => "E_SRC_RATE",
            SourceError::InvalidResponse { .. } => "E_SRC_INVALID",
            SourceError::Cancelled => "E_SRC_CANCEL",
            SourceError::Other { .. } => "E_SRC_OTHER",
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::InvalidResponse {
            message: err.to_string(),
        }
    }
}

/// Classify a reqwest error into a SourceError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> SourceError {
    if err.is_connect() {
        SourceError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_status() {
        match err.status().map(|s| s.as_u16()) {
            Some(429) => SourceError::RateLimited,
            Some(status) => SourceError::HttpStatus {
                status,
                message: err.to_string(),
            },
            None => SourceError::HttpStatus {
                status: 0,
                message: err.to_string(),
            },
        }
    } else if err.is_decode() {
        SourceError::InvalidResponse {
            message: format!("Failed to decode response: {}", err),
        }
    } else {
        let err_str = err.to_string().to_lowercase();
        if err_str.contains("dns") || err_str.contains("resolve") {
            SourceError::DnsResolutionFailed {
                host: extract_host_from_url(url),
            }
        } else {
            SourceError::Other {
                message: err.to_string(),
            }
        }
    }
}

/// Extract the host portion from a URL string.
fn extract_host_from_url(url: &str) -> String {
    let url_lower = url.to_lowercase();
    let without_scheme = if url_lower.starts_with("https://") {
        &url[8..]
    } else if url_lower.starts_with("http://") {
        &url[7..]
    } else {
        url
    };

    without_scheme
        .split(&['/', ':'][..])
        .next()
        .unwrap_or(url)
        .to_string()
}

/// A single image that could not be preloaded.
#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("unsupported image reference '{0}'")]
    UnsupportedReference(String),

    #[error("fetching '{url}' failed: {message}")]
    Fetch { url: String, message: String },

    #[error("fetching '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("'{0}' is not a recognized image")]
    UnrecognizedImage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_is_retryable() {
        let err = SourceError::ConnectionFailed {
            url: "http://localhost:5000".to_string(),
            message: "Connection refused".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_SRC_CONN");
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_http_status_retryable_for_server_errors() {
        let err_502 = SourceError::HttpStatus {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err_502.is_retryable());
        assert_eq!(err_502.category(), ErrorCategory::Server);

        let err_404 = SourceError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(!err_404.is_retryable());
        assert_eq!(err_404.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_json_error_is_invalid_response() {
        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: SourceError = json_err.into();
        assert!(matches!(err, SourceError::InvalidResponse { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_local_failures_are_system_errors() {
        let build = SourceError::Other {
            message: "failed to build HTTP client".to_string(),
        };
        assert_eq!(build.category(), ErrorCategory::System);
        assert!(!build.is_retryable());
        assert_eq!(SourceError::Cancelled.category(), ErrorCategory::System);
        assert_eq!(SourceError::Cancelled.error_code(), "E_SRC_CANCEL");
    }

    #[test]
    fn test_display() {
        let err = SourceError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 error: boom");
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(extract_host_from_url("https://dogs.example:8443/api"), "dogs.example");
        assert_eq!(extract_host_from_url("http://localhost/api/dogs"), "localhost");
        assert_eq!(extract_host_from_url("plainhost"), "plainhost");
    }
}
