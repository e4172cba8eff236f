//! Error handling for lanefeed.
//!
//! - **Error Categories**: coarse classification for logs and retry decisions
//! - **Source Errors**: failed batch requests and per-image preload failures
//! - **Config Errors**: unreadable or invalid configuration
//! - **Unified Error Type**: `FeedError` for the outer entry points
//!
//! The pipeline controller itself never returns errors. A failed batch is
//! absorbed by its fallback chain and an exhausted pipeline keeps running
//! with under-filled lanes.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Server | Upstream 5xx, rate limiting | Yes |
//! | Client | Malformed responses, 4xx | No |
//! | System | OS/filesystem errors | No |
//! | Configuration | Config issues | No |

mod category;
mod config;
mod feed_error;
mod source;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use feed_error::{FeedError, FeedResult};
pub use source::{classify_reqwest_error, PreloadError, SourceError};
