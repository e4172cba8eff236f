//! Common test utilities for integration tests.
//!
//! Item factories, small pipeline configurations and helpers for waiting on
//! a running pipeline.
//!
//! # Example
//!
//! ```ignore
//! use common::{items, small_config};
//!
//! let mut controller = PipelineController::new(small_config());
//! let _ = controller.initialize(items("d", 4), Vec::new());
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::future::Future;
use std::time::Duration;

use lanefeed::config::PipelineConfig;
use lanefeed::models::Item;

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// `n` items with ids `{prefix}0..{prefix}{n-1}`.
pub fn items(prefix: &str, n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::new(format!("{prefix}{i}"), format!("mock://{prefix}/{i}")))
        .collect()
}

/// One lane holding a single item; every drain consumes one reservoir item.
pub fn single_slot_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_lane_count(1)
        .with_visible_count(1)
        .with_prefetch_margin(0)
}

/// Two lanes of depth two with small batches.
pub fn small_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_lane_count(2)
        .with_visible_count(2)
        .with_prefetch_margin(0)
        .with_low_water(2)
        .with_batch_size(4)
        .with_bootstrap_buffer(0)
}

/// Await `fut`, failing the test if it takes longer than [`WAIT`].
pub async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(WAIT, fut)
        .await
        .expect("timed out waiting for pipeline")
}

/// Poll `condition` until it holds, failing the test after [`WAIT`].
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    within(async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}
