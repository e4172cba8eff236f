//! Feed startup with dependency injection.
//!
//! Validates a [`FeedConfig`], wires the item source and exit detector and
//! bootstraps the pipeline. [`launch`] uses the production adapters;
//! [`launch_with`] accepts injected ones for tests and embedders.
//!
//! # Usage
//!
//! ```ignore
//! use lanefeed::config::FeedConfig;
//! use lanefeed::startup::launch;
//!
//! let handle = launch(&FeedConfig::load(None)?).await?;
//! println!("{}", handle.snapshot().summary());
//! ```

use std::sync::Arc;

use tracing::info;

use crate::adapters::{HttpItemSource, TimerExitDetector};
use crate::config::FeedConfig;
use crate::error::FeedResult;
use crate::pipeline::{PipelineHandle, PipelineRuntime};
use crate::traits::{ExitDetector, ItemSource};

/// Start a feed against the configured image proxy with timed exits.
pub async fn launch(config: &FeedConfig) -> FeedResult<PipelineHandle> {
    config.validate()?;
    let source = HttpItemSource::new(&config.source)?;
    info!(
        endpoint = source.endpoint(),
        lanes = config.pipeline.lane_count,
        batch_size = config.pipeline.batch_size,
        "Starting feed"
    );
    let detector = TimerExitDetector::new(&config.exit, config.pipeline.lane_count);
    launch_with(config, Arc::new(source), Box::new(detector)).await
}

/// Start a feed with injected collaborators.
pub async fn launch_with(
    config: &FeedConfig,
    source: Arc<dyn ItemSource>,
    detector: Box<dyn ExitDetector>,
) -> FeedResult<PipelineHandle> {
    config.validate()?;
    let handle = PipelineRuntime::new(config.pipeline.clone(), source)
        .start(detector)
        .await?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{ChannelExitDetector, MockItemSource};
    use crate::config::PipelineConfig;
    use crate::error::{ErrorCategory, FeedError, SourceError};

    fn config() -> FeedConfig {
        FeedConfig::default().with_pipeline(PipelineConfig::default().with_bootstrap_buffer(0))
    }

    #[tokio::test]
    async fn test_launch_with_mock_source() {
        let source = Arc::new(MockItemSource::new());
        let (detector, _events) = ChannelExitDetector::new();

        let handle = launch_with(&config(), source.clone(), Box::new(detector))
            .await
            .unwrap();

        assert_eq!(handle.snapshot().lane_lengths(), vec![11, 11, 11]);
        assert_eq!(source.requests()[0], 33);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_fetching() {
        let source = Arc::new(MockItemSource::new());
        let (detector, _events) = ChannelExitDetector::new();
        let config = config().with_pipeline(PipelineConfig::default().with_lane_count(0));

        let err = launch_with(&config, source.clone(), Box::new(detector))
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Config(_)));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_surfaces_as_source_error() {
        let source = Arc::new(MockItemSource::offline(SourceError::Timeout {
            url: "http://localhost:5000/api/dogs".to_string(),
        }));
        let (detector, _events) = ChannelExitDetector::new();

        let err = launch_with(&config(), source, Box::new(detector))
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Source(SourceError::Timeout { .. })));
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_SRC_TIMEOUT");
    }
}
