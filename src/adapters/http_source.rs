//! HTTP item source.
//!
//! Requests batches from the image proxy (`GET {base_url}{path}?size=N`)
//! and preloads every image before handing the batch over. A batch either
//! arrives or the request fails as a whole; individual images that cannot
//! be loaded are logged and left out, so a successful batch may be shorter
//! than requested.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use super::preload::Preloader;
use crate::config::SourceConfig;
use crate::error::{classify_reqwest_error, SourceError};
use crate::models::{parse_batch, Item};
use crate::traits::ItemSource;

/// Item source backed by the image proxy.
///
/// # Example
///
/// ```ignore
/// use lanefeed::adapters::HttpItemSource;
/// use lanefeed::config::SourceConfig;
///
/// let source = HttpItemSource::new(&SourceConfig::default())?;
/// let items = source.fetch_batch(40).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpItemSource {
    client: reqwest::Client,
    endpoint: String,
    preloader: Preloader,
}

impl HttpItemSource {
    /// Create a source with a client using the configured request timeout.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SourceError::Other {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, config))
    }

    /// Create a source with a custom reqwest client.
    pub fn with_client(client: reqwest::Client, config: &SourceConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            endpoint: format!("{}{}", base_url, config.path),
            preloader: Preloader::new(client.clone(), base_url),
            client,
        }
    }

    /// Batch endpoint without the query string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ItemSource for HttpItemSource {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Item>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}?size={}", self.endpoint, count);
        debug!(%url, "Requesting batch");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, &url))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(SourceError::RateLimited);
            }
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e, &url))?;
        let descriptors = parse_batch(&body)?;

        let results = join_all(descriptors.iter().map(|d| self.preloader.load(d))).await;

        let mut items = Vec::with_capacity(results.len());
        let mut excluded = 0usize;
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(e) => {
                    excluded += 1;
                    warn!(error = %e, "Dropping image that failed to preload");
                }
            }
        }
        items.truncate(count);

        debug!(requested = count, received = items.len(), excluded, "Batch loaded");
        Ok(items)
    }
}
