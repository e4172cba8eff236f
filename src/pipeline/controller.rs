//! Pipeline controller.
//!
//! Owns every container of one pipeline instance: the reservoir, the
//! overflow buffer, the lane queues and the recycle pool. All mutations are
//! synchronous; the only asynchronous step, fetching a batch, is handed to
//! the caller as a [`ReplenishTicket`] and applied later through
//! [`PipelineController::complete_replenish`]. That keeps the controller
//! free of I/O and lets a single owner serialize every mutation.
//!
//! Item flow:
//!
//! ```text
//! source -> reservoir / overflow -> lane 0 -> lane 1 -> ... -> lane L-1 -> recycle pool
//!                 ^                                                            |
//!                 +-------------------- fallback on fetch failure ------------+
//! ```

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use super::lanes::LaneQueues;
use super::recycle::RecyclePool;
use super::snapshot::{PipelineSnapshot, PipelineState, PipelineStats};
use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::models::Item;

/// A replenishment the owner must run against the item source.
///
/// Tickets carry the generation they were issued in; results for an older
/// generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplenishTicket {
    /// Unique per controller, identifies the in-flight request
    pub id: u64,
    pub generation: u64,
    /// Batch size to request
    pub count: usize,
}

/// Where the items applied by a completed replenishment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillSource {
    /// Fresh items from the item source
    Network { received: usize },
    /// Moved from the overflow buffer after a failed fetch
    Overflow { moved: usize },
    /// Drawn at random from the recycle pool after a failed fetch
    Recycle { moved: usize },
    /// The fetch failed and nothing was left to fall back on
    Exhausted,
    /// The result belonged to a discarded generation and was ignored
    Stale,
}

/// Result of applying a replenishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ReplenishOutcome {
    pub source: RefillSource,
    /// Follow-up replenishment, if the reservoir is still low
    pub next: Option<ReplenishTicket>,
}

/// The supply pipeline of one feed view.
#[derive(Debug)]
pub struct PipelineController {
    config: PipelineConfig,
    state: PipelineState,
    generation: u64,
    reservoir: VecDeque<Item>,
    overflow: VecDeque<Item>,
    lanes: LaneQueues,
    recycle: RecyclePool,
    replenish_in_flight: Option<u64>,
    next_ticket_id: u64,
    stats: PipelineStats,
    rng: fastrand::Rng,
}

impl PipelineController {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Create a controller with a fixed random source for recycle shuffles.
    pub fn with_rng(config: PipelineConfig, rng: fastrand::Rng) -> Self {
        Self {
            lanes: LaneQueues::new(config.lane_count, config.target_depth()),
            recycle: RecyclePool::new(config.recycle_capacity),
            config,
            state: PipelineState::Uninitialized,
            generation: 0,
            reservoir: VecDeque::new(),
            overflow: VecDeque::new(),
            replenish_in_flight: None,
            next_ticket_id: 0,
            stats: PipelineStats::default(),
            rng,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a new pipeline generation.
    ///
    /// Seeds the reservoir with `initial` and the overflow buffer with
    /// `buffer`, empties everything else and fills the lanes in order. Too
    /// few items leave lanes under-filled; that is not an error.
    ///
    /// # Returns
    /// A replenishment to run if the reservoir is already below the
    /// low-water mark
    pub fn initialize(&mut self, initial: Vec<Item>, buffer: Vec<Item>) -> Option<ReplenishTicket> {
        self.generation += 1;
        self.state = PipelineState::Initializing;
        self.replenish_in_flight = None;
        self.stats = PipelineStats::default();
        self.reservoir = initial.into();
        self.overflow = buffer.into();
        self.recycle.clear();
        self.lanes.clear();

        for lane in 0..self.lanes.lane_count() {
            self.fill(lane);
        }
        self.state = PipelineState::Ready;

        info!(
            generation = self.generation,
            lanes = ?self.lane_lengths(),
            reservoir = self.reservoir.len(),
            overflow = self.overflow.len(),
            "Pipeline initialized"
        );

        self.maybe_replenish()
    }

    /// Discard the current generation. Outstanding tickets become stale.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.state = PipelineState::Uninitialized;
        self.replenish_in_flight = None;
        self.reservoir.clear();
        self.overflow.clear();
        self.recycle.clear();
        self.lanes.clear();
        debug!(generation = self.generation, "Pipeline torn down");
    }

    // ========================================================================
    // Lane operations
    // ========================================================================

    /// Top a lane up to target depth.
    ///
    /// Lane 0 draws from the reservoir, then the overflow buffer. Every
    /// other lane pulls from its predecessor's head; a predecessor that runs
    /// dry refills itself from its own source first. The recycle pool is
    /// never a fill source.
    pub fn fill_lane(&mut self, lane: usize) -> Option<ReplenishTicket> {
        if !self.is_ready() || lane >= self.lanes.lane_count() {
            return None;
        }
        self.fill(lane);
        self.maybe_replenish()
    }

    /// Remove the head item of a lane and cascade it.
    ///
    /// The item moves to the tail of the next lane, or into the recycle
    /// pool when it leaves the last lane. Both affected lanes are then
    /// refilled. An empty or unknown lane makes this a no-op.
    pub fn drain_lane(&mut self, lane: usize) -> Option<ReplenishTicket> {
        if !self.is_ready() || lane >= self.lanes.lane_count() {
            return None;
        }
        let item = self.lanes.pop_front(lane)?;
        self.stats.drains += 1;

        if lane + 1 < self.lanes.lane_count() {
            trace!(lane, item = %item.id, "Cascading item");
            self.lanes.push_back(lane + 1, item);
            self.stats.cascades += 1;
            self.fill(lane + 1);
        } else {
            trace!(lane, item = %item.id, "Recycling item");
            self.stats.recycled += 1;
            if let Some(evicted) = self.recycle.push(item) {
                self.stats.evicted += 1;
                trace!(item = %evicted.id, "Evicted oldest recycled item");
            }
        }

        self.fill(lane);
        self.maybe_replenish()
    }

    fn fill(&mut self, lane: usize) {
        let mut dry_through = None;
        self.fill_from_upstream(lane, &mut dry_through);
    }

    /// `dry_through` is the highest lane known to be empty with nothing
    /// left upstream of it. Filling only moves items downstream, so a dry
    /// prefix stays dry for the rest of the fill and is never revisited.
    fn fill_from_upstream(&mut self, lane: usize, dry_through: &mut Option<usize>) {
        if lane > 0 && is_dry(*dry_through, lane - 1) {
            return;
        }
        let target = self.config.target_depth();
        while self.lanes.len(lane) < target {
            let next = if lane == 0 {
                self.draw_fresh()
            } else {
                self.draw_from_predecessor(lane - 1, dry_through)
            };
            match next {
                Some(item) => self.lanes.push_back(lane, item),
                None => break,
            }
        }
        if lane > 0 {
            self.fill_from_upstream(lane - 1, dry_through);
        }
    }

    fn draw_fresh(&mut self) -> Option<Item> {
        self.reservoir
            .pop_front()
            .or_else(|| self.overflow.pop_front())
    }

    fn draw_from_predecessor(
        &mut self,
        predecessor: usize,
        dry_through: &mut Option<usize>,
    ) -> Option<Item> {
        if is_dry(*dry_through, predecessor) {
            return None;
        }
        if self.lanes.is_empty(predecessor) {
            self.fill_from_upstream(predecessor, dry_through);
            if self.lanes.is_empty(predecessor) {
                *dry_through = Some(predecessor);
                return None;
            }
        }
        self.lanes.pop_front(predecessor)
    }

    // ========================================================================
    // Replenishment
    // ========================================================================

    /// Request a replenishment if the reservoir is below the low-water mark
    /// and none is in flight.
    pub fn maybe_replenish(&mut self) -> Option<ReplenishTicket> {
        if !self.is_ready() || self.reservoir.len() >= self.config.low_water {
            return None;
        }
        if self.replenish_in_flight.is_some() {
            trace!(reservoir = self.reservoir.len(), "Replenishment already in flight");
            return None;
        }

        self.next_ticket_id += 1;
        self.replenish_in_flight = Some(self.next_ticket_id);
        self.stats.fetches_started += 1;
        debug!(
            generation = self.generation,
            reservoir = self.reservoir.len(),
            count = self.config.batch_size,
            "Requesting replenishment"
        );
        Some(ReplenishTicket {
            id: self.next_ticket_id,
            generation: self.generation,
            count: self.config.batch_size,
        })
    }

    /// Apply the result of a replenishment.
    ///
    /// Success appends the received items to the reservoir. Failure runs the
    /// fallback chain: a full batch from the overflow buffer, else up to a
    /// batch of shuffled items from the recycle pool, else nothing. Either
    /// way the single-flight guard is released and the lanes are topped up.
    pub fn complete_replenish(
        &mut self,
        ticket: ReplenishTicket,
        result: Result<Vec<Item>, SourceError>,
    ) -> ReplenishOutcome {
        if ticket.generation != self.generation
            || !self.is_ready()
            || self.replenish_in_flight != Some(ticket.id)
        {
            self.stats.stale_results += 1;
            warn!(
                ticket = ticket.id,
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Discarding stale replenishment result"
            );
            return ReplenishOutcome {
                source: RefillSource::Stale,
                next: None,
            };
        }
        self.replenish_in_flight = None;

        let source = match result {
            Ok(mut items) => {
                if items.len() > ticket.count {
                    warn!(
                        received = items.len(),
                        requested = ticket.count,
                        "Source returned more items than requested, truncating"
                    );
                    items.truncate(ticket.count);
                }
                let received = items.len();
                self.reservoir.extend(items);
                self.stats.fetches_succeeded += 1;
                self.stats.items_received += received as u64;
                info!(received, reservoir = self.reservoir.len(), "Reservoir replenished");
                RefillSource::Network { received }
            }
            Err(err) => {
                self.stats.fetches_failed += 1;
                warn!(
                    error = %err,
                    code = err.error_code(),
                    category = %err.category(),
                    "Replenishment failed, falling back"
                );
                self.fallback(ticket.count)
            }
        };

        for lane in 0..self.lanes.lane_count() {
            self.fill(lane);
        }

        let next = match source {
            RefillSource::Network { received: 0 } | RefillSource::Exhausted => None,
            _ => self.maybe_replenish(),
        };
        ReplenishOutcome { source, next }
    }

    fn fallback(&mut self, count: usize) -> RefillSource {
        if self.overflow.len() >= count {
            self.reservoir.extend(self.overflow.drain(..count));
            self.stats.fallback_overflow += 1;
            info!(moved = count, overflow = self.overflow.len(), "Refilled reservoir from overflow buffer");
            RefillSource::Overflow { moved: count }
        } else if !self.recycle.is_empty() {
            let taken = self.recycle.take_shuffled(count, &mut self.rng);
            let moved = taken.len();
            self.reservoir.extend(taken);
            self.stats.fallback_recycle += 1;
            info!(moved, recycle = self.recycle.len(), "Refilled reservoir from recycle pool");
            RefillSource::Recycle { moved }
        } else {
            self.stats.fallback_exhausted += 1;
            warn!(
                reservoir = self.reservoir.len(),
                overflow = self.overflow.len(),
                "No fallback supply left, lanes will run short"
            );
            RefillSource::Exhausted
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.lane_count()
    }

    pub fn lane_len(&self, lane: usize) -> usize {
        self.lanes.len(lane)
    }

    pub fn lane_lengths(&self) -> Vec<usize> {
        (0..self.lanes.lane_count()).map(|l| self.lanes.len(l)).collect()
    }

    /// Items of a lane, head first.
    pub fn lane(&self, lane: usize) -> impl Iterator<Item = &Item> {
        self.lanes.iter(lane)
    }

    /// The item a renderer shows first in a lane.
    pub fn lane_head(&self, lane: usize) -> Option<&Item> {
        self.lanes.head(lane)
    }

    pub fn reservoir_len(&self) -> usize {
        self.reservoir.len()
    }

    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    pub fn recycle_pool(&self) -> &RecyclePool {
        &self.recycle
    }

    pub fn is_replenishing(&self) -> bool {
        self.replenish_in_flight.is_some()
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Total items held across all containers.
    pub fn total_items(&self) -> usize {
        self.reservoir.len() + self.overflow.len() + self.lanes.total_len() + self.recycle.len()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            state: self.state,
            generation: self.generation,
            lanes: (0..self.lanes.lane_count())
                .map(|l| self.lanes.iter(l).map(|item| item.id.clone()).collect())
                .collect(),
            reservoir: self.reservoir.len(),
            overflow: self.overflow.len(),
            recycle: self.recycle.len(),
            replenish_in_flight: self.replenish_in_flight.is_some(),
            stats: self.stats.clone(),
        }
    }
}

fn is_dry(dry_through: Option<usize>, lane: usize) -> bool {
    dry_through.is_some_and(|dry| dry >= lane)
}
