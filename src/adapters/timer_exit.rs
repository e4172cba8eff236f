//! Timer-driven exit detection.
//!
//! Stands in for a viewport observer when nothing is rendered: every lane
//! ticks at its own interval and each tick reports one departed item. A
//! constant-speed marquee loses items at a steady rate, so a per-lane
//! interval is a faithful model of it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ExitConfig;
use crate::traits::{ExitDetector, ExitEvent};

pub struct TimerExitDetector {
    intervals: Vec<Duration>,
}

impl TimerExitDetector {
    /// One ticker per lane, with intervals taken from `config`.
    pub fn new(config: &ExitConfig, lane_count: usize) -> Self {
        Self {
            intervals: (0..lane_count).map(|lane| config.interval_for(lane)).collect(),
        }
    }

    /// Explicit per-lane intervals.
    pub fn with_intervals(intervals: Vec<Duration>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }
}

impl ExitDetector for TimerExitDetector {
    fn start(self: Box<Self>, events: mpsc::UnboundedSender<ExitEvent>) -> JoinHandle<()> {
        let intervals = self.intervals;
        tokio::spawn(async move {
            tracing::info!(lanes = intervals.len(), "Timer exit detector started");

            let lanes: Vec<JoinHandle<()>> = intervals
                .into_iter()
                .enumerate()
                .map(|(lane, period)| {
                    let events = events.clone();
                    tokio::spawn(async move {
                        let mut interval = tokio::time::interval(period);
                        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        // The first tick completes immediately; items have
                        // only just entered the lane.
                        interval.tick().await;
                        loop {
                            interval.tick().await;
                            if events.send(ExitEvent::new(lane)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(events);

            let _guard = AbortOnDrop(lanes);
            std::future::pending::<()>().await;
        })
    }
}

/// Aborts the per-lane tickers when the detector task is aborted.
struct AbortOnDrop(Vec<JoinHandle<()>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}
