//! Integration tests for a running pipeline.
//!
//! A [`MockItemSource`] stands in for the image proxy and a
//! [`ChannelExitDetector`] lets each test decide when items leave a lane.

mod common;

use std::sync::Arc;

use common::{
    connection_refused, flaky_source, items, scripted_source, single_slot_config, small_config,
    wait_until, within, ChannelExitDetector, MockBatch, MockItemSource, SourceError,
};
use lanefeed::pipeline::{PipelineRuntime, PipelineState, Seed};
use lanefeed::traits::ExitEvent;

#[tokio::test]
async fn test_bootstrap_request_covers_lanes_and_buffer() {
    let source = Arc::new(MockItemSource::new());
    let (detector, _events) = ChannelExitDetector::new();
    let config = small_config().with_bootstrap_buffer(6);

    let handle = PipelineRuntime::new(config, source.clone())
        .start(Box::new(detector))
        .await
        .unwrap();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, PipelineState::Ready);
    assert_eq!(snapshot.lane_lengths(), vec![2, 2]);
    assert_eq!(snapshot.overflow, 6);
    assert_eq!(source.requests()[0], 10);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_bootstrap_failure_is_returned() {
    let source = Arc::new(MockItemSource::offline(SourceError::RateLimited));
    let (detector, _events) = ChannelExitDetector::new();

    let result = PipelineRuntime::new(small_config(), source)
        .start(Box::new(detector))
        .await;

    assert!(matches!(result, Err(SourceError::RateLimited)));
}

#[tokio::test]
async fn test_single_request_while_fetch_pending() {
    let source = Arc::new(MockItemSource::new());
    source.hold();
    let (detector, events) = ChannelExitDetector::new();
    let config = single_slot_config().with_low_water(5).with_batch_size(5);
    let seed = Seed::split(items("d", 4), config.initial_total());

    let handle = PipelineRuntime::new(config, source.clone()).start_with(seed, Box::new(detector));
    let mut rx = handle.subscribe();

    wait_until(|| source.request_count() == 1).await;
    events.send(ExitEvent::new(0)).unwrap();
    events.send(ExitEvent::new(0)).unwrap();
    within(rx.wait_for(|s| s.stats.drains == 2)).await.unwrap();

    assert_eq!(source.requests(), vec![5]);
    assert!(handle.snapshot().replenish_in_flight);

    source.release();
    let snapshot = within(rx.wait_for(|s| !s.replenish_in_flight))
        .await
        .unwrap()
        .clone();
    // The drains refilled the lane from the overflow buffer
    assert_eq!(snapshot.reservoir, 5);
    assert_eq!(snapshot.overflow, 1);
    assert_eq!(source.requests(), vec![5]);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_failed_fetch_falls_back_to_overflow() {
    let config = single_slot_config()
        .with_low_water(2)
        .with_batch_size(3)
        .with_bootstrap_buffer(3);
    let source = Arc::new(scripted_source(
        items("d", 4),
        vec![MockBatch::Failure(connection_refused())],
    ));
    let (detector, _events) = ChannelExitDetector::new();

    let handle = PipelineRuntime::new(config, source.clone())
        .start(Box::new(detector))
        .await
        .unwrap();
    let mut rx = handle.subscribe();

    let snapshot = within(rx.wait_for(|s| s.stats.fallback_overflow == 1))
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.reservoir, 3);
    assert_eq!(snapshot.overflow, 0);
    assert!(!snapshot.replenish_in_flight);
    // The fallback lifted the reservoir back above low water
    assert_eq!(source.requests(), vec![4, 3]);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_offline_pipeline_recovers_from_recycle_pool() {
    let config = single_slot_config().with_low_water(2).with_batch_size(3);
    let source = Arc::new(flaky_source(items("d", 1)));
    let (detector, events) = ChannelExitDetector::new();

    let handle = PipelineRuntime::new(config.with_bootstrap_buffer(0), source.clone())
        .start(Box::new(detector))
        .await
        .unwrap();
    let mut rx = handle.subscribe();

    within(rx.wait_for(|s| s.stats.fallback_exhausted == 1))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().lane_lengths(), vec![1]);

    // The only item leaves, is recycled, and comes back through the fallback
    events.send(ExitEvent::new(0)).unwrap();
    let snapshot = within(rx.wait_for(|s| s.stats.fallback_recycle == 1))
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.lane_lengths(), vec![1]);
    assert_eq!(snapshot.recycle, 0);
    assert_eq!(handle.lane_items(0).await[0].id.as_str(), "d0");

    // The reservoir is still low after the recycle fallback, so one more
    // request goes out and ends with nothing left to fall back on
    let snapshot = within(rx.wait_for(|s| s.stats.fallback_exhausted == 2))
        .await
        .unwrap()
        .clone();
    assert!(!snapshot.replenish_in_flight);
    assert_eq!(source.requests(), vec![1, 3, 3, 3]);
    assert_eq!(snapshot.lane_lengths(), vec![1]);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_exit_for_unknown_lane_is_ignored() {
    let source = Arc::new(MockItemSource::new());
    let (detector, events) = ChannelExitDetector::new();
    let handle = PipelineRuntime::new(small_config(), source)
        .start(Box::new(detector))
        .await
        .unwrap();
    let mut rx = handle.subscribe();

    events.send(ExitEvent::new(7)).unwrap();
    events.send(ExitEvent::with_item(1, "not-the-head")).unwrap();

    let snapshot = within(rx.wait_for(|s| s.stats.drains == 1))
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.recycle, 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_discards_pending_fetch() {
    let source = Arc::new(MockItemSource::new());
    source.hold();
    let (detector, _events) = ChannelExitDetector::new();
    let config = single_slot_config().with_low_water(5).with_batch_size(5);
    let seed = Seed::split(items("d", 2), config.initial_total());

    let handle = PipelineRuntime::new(config, source.clone()).start_with(seed, Box::new(detector));
    wait_until(|| source.request_count() == 1).await;

    let last = handle.shutdown().await;
    assert!(last.replenish_in_flight);
    assert_eq!(last.stats.fetches_succeeded, 0);

    // Releasing the aborted fetch has nothing left to deliver to
    source.release();
}

#[tokio::test]
async fn test_lane_view_matches_snapshot() {
    let source = Arc::new(MockItemSource::new());
    let (detector, events) = ChannelExitDetector::new();
    let handle = PipelineRuntime::new(small_config(), source)
        .with_rng_seed(3)
        .start(Box::new(detector))
        .await
        .unwrap();
    let mut rx = handle.subscribe();
    within(rx.wait_for(|s| s.reservoir == 4 && !s.replenish_in_flight))
        .await
        .unwrap();

    events.send(ExitEvent::new(0)).unwrap();
    let snapshot = within(rx.wait_for(|s| s.stats.drains == 1))
        .await
        .unwrap()
        .clone();

    let lanes = handle.lanes().await;
    let view_ids: Vec<Vec<String>> = lanes
        .iter()
        .map(|lane| lane.iter().map(|item| item.id.to_string()).collect())
        .collect();
    let snapshot_ids: Vec<Vec<String>> = snapshot
        .lanes
        .iter()
        .map(|lane| lane.iter().map(|id| id.to_string()).collect())
        .collect();
    assert_eq!(view_ids, snapshot_ids);

    handle.shutdown().await;
}
