//! Async driver for a pipeline controller.
//!
//! One task owns the [`PipelineController`] and is the only place that
//! mutates it. Exit events and fetch completions arrive on channels and are
//! applied one at a time, so a drain and its cascade are never interleaved
//! with another mutation. Fetches run on their own spawned tasks and send
//! their result back together with the ticket that started them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lanefeed::adapters::{HttpItemSource, TimerExitDetector};
//! use lanefeed::pipeline::PipelineRuntime;
//!
//! let source = Arc::new(HttpItemSource::new(&config.source)?);
//! let handle = PipelineRuntime::new(config.pipeline.clone(), source)
//!     .start(Box::new(TimerExitDetector::new(&config.exit, 3)))
//!     .await?;
//! let lane0 = handle.lane_items(0).await;
//! handle.shutdown().await;
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::bootstrap::{bootstrap, Seed};
use super::controller::{PipelineController, ReplenishTicket};
use super::snapshot::PipelineSnapshot;
use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::models::Item;
use crate::traits::{ExitDetector, ExitEvent, ItemSource};

/// Builder for a running pipeline.
pub struct PipelineRuntime {
    config: PipelineConfig,
    source: Arc<dyn ItemSource>,
    rng_seed: Option<u64>,
}

impl PipelineRuntime {
    pub fn new(config: PipelineConfig, source: Arc<dyn ItemSource>) -> Self {
        Self {
            config,
            source,
            rng_seed: None,
        }
    }

    /// Use a fixed seed for recycle pool shuffles.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Bootstrap from the item source, then start.
    pub async fn start(self, detector: Box<dyn ExitDetector>) -> Result<PipelineHandle, SourceError> {
        let seed = bootstrap(self.source.as_ref(), &self.config).await?;
        Ok(self.start_with(seed, detector))
    }

    /// Start with an already fetched seed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_with(self, seed: Seed, detector: Box<dyn ExitDetector>) -> PipelineHandle {
        let rng = match self.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut controller = PipelineController::with_rng(self.config, rng);
        let first = controller.initialize(seed.initial, seed.buffer);

        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let view = Arc::new(RwLock::new(lane_view(&controller)));
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let detector_task = detector.start(exit_tx);

        let mut event_loop = EventLoop {
            controller,
            source: self.source,
            completion_tx,
            fetch_task: None,
            snapshot_tx,
            view: Arc::clone(&view),
        };
        event_loop.dispatch(first);

        let task = tokio::spawn(event_loop.run(exit_rx, completion_rx, shutdown_rx));

        PipelineHandle {
            snapshot_rx,
            view,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            detector_task: Some(detector_task),
        }
    }
}

/// Handle to a running pipeline.
///
/// Dropping the handle stops the pipeline; [`PipelineHandle::shutdown`]
/// does the same and waits for the final snapshot.
#[derive(Debug)]
pub struct PipelineHandle {
    snapshot_rx: watch::Receiver<PipelineSnapshot>,
    view: Arc<RwLock<Vec<Vec<Item>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<PipelineSnapshot>>,
    detector_task: Option<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Items currently queued in a lane, head first.
    pub async fn lane_items(&self, lane: usize) -> Vec<Item> {
        self.view.read().await.get(lane).cloned().unwrap_or_default()
    }

    /// Items of every lane, head first.
    pub async fn lanes(&self) -> Vec<Vec<Item>> {
        self.view.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the detector and the event loop.
    ///
    /// Any in-flight fetch is aborted, so its result can never reach the
    /// discarded pipeline.
    ///
    /// # Returns
    /// The last snapshot before teardown
    pub async fn shutdown(mut self) -> PipelineSnapshot {
        if let Some(detector) = self.detector_task.take() {
            detector.abort();
        }
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let last = self.snapshot();
        match self.task.take() {
            Some(task) => task.await.unwrap_or(last),
            None => last,
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if let Some(detector) = self.detector_task.take() {
            detector.abort();
        }
        // Dropping shutdown_tx ends the event loop
    }
}

struct Completion {
    ticket: ReplenishTicket,
    result: Result<Vec<Item>, SourceError>,
}

struct EventLoop {
    controller: PipelineController,
    source: Arc<dyn ItemSource>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    fetch_task: Option<JoinHandle<()>>,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
    view: Arc<RwLock<Vec<Vec<Item>>>>,
}

impl EventLoop {
    async fn run(
        mut self,
        mut exits: mpsc::UnboundedReceiver<ExitEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> PipelineSnapshot {
        info!(generation = self.controller.generation(), "Pipeline event loop started");
        let mut exits_open = true;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = exits.recv(), if exits_open => match event {
                    Some(event) => self.handle_exit(event),
                    None => {
                        debug!("Exit detector stopped");
                        exits_open = false;
                        continue;
                    }
                },
                Some(done) = completions.recv() => self.handle_completion(done),
            }
            self.publish().await;
        }

        if let Some(fetch) = self.fetch_task.take() {
            fetch.abort();
        }
        let last = self.controller.snapshot();
        self.controller.teardown();
        info!(drains = last.stats.drains, "Pipeline event loop stopped");
        last
    }

    fn handle_exit(&mut self, event: ExitEvent) {
        let lane_count = self.controller.lane_count();
        if event.lane >= lane_count {
            warn!(lane = event.lane, lane_count, "Ignoring exit event for unknown lane");
            return;
        }
        if let Some(id) = &event.item_id {
            let head = self.controller.lane_head(event.lane).map(|item| &item.id);
            if head != Some(id) {
                debug!(lane = event.lane, exited = %id, head = ?head, "Exit event does not match lane head");
            }
        }
        let ticket = self.controller.drain_lane(event.lane);
        self.dispatch(ticket);
    }

    fn handle_completion(&mut self, done: Completion) {
        self.fetch_task = None;
        let outcome = self.controller.complete_replenish(done.ticket, done.result);
        debug!(source = ?outcome.source, "Replenishment applied");
        self.dispatch(outcome.next);
    }

    fn dispatch(&mut self, ticket: Option<ReplenishTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let source = Arc::clone(&self.source);
        let tx = self.completion_tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_batch(ticket.count).await;
            // The loop may already be gone; nothing to deliver to then
            let _ = tx.send(Completion { ticket, result });
        }));
    }

    async fn publish(&self) {
        let snapshot = self.controller.snapshot();
        *self.view.write().await = lane_view(&self.controller);
        self.snapshot_tx.send_replace(snapshot);
    }
}

fn lane_view(controller: &PipelineController) -> Vec<Vec<Item>> {
    (0..controller.lane_count())
        .map(|lane| controller.lane(lane).cloned().collect())
        .collect()
}
