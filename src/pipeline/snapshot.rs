//! Point-in-time views of a pipeline for status reporting.

use serde::Serialize;

use crate::models::ItemId;

/// Lifecycle of a pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Running counters since the last `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Drains that removed an item
    pub drains: u64,
    /// Items handed from one lane to the next
    pub cascades: u64,
    /// Items pushed into the recycle pool
    pub recycled: u64,
    /// Items evicted from a full recycle pool
    pub evicted: u64,
    pub fetches_started: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    /// Failed fetches covered from the overflow buffer
    pub fallback_overflow: u64,
    /// Failed fetches covered from the recycle pool
    pub fallback_recycle: u64,
    /// Failed fetches with nothing to fall back on
    pub fallback_exhausted: u64,
    /// Results discarded because they belonged to another generation
    pub stale_results: u64,
    /// Items received from successful fetches
    pub items_received: u64,
}

/// Serializable snapshot of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub generation: u64,
    /// Item ids per lane, head first
    pub lanes: Vec<Vec<ItemId>>,
    pub reservoir: usize,
    pub overflow: usize,
    pub recycle: usize,
    pub replenish_in_flight: bool,
    pub stats: PipelineStats,
}

impl PipelineSnapshot {
    /// Snapshot of a pipeline that has not been initialized yet.
    pub fn empty(lane_count: usize) -> Self {
        Self {
            state: PipelineState::Uninitialized,
            generation: 0,
            lanes: vec![Vec::new(); lane_count],
            reservoir: 0,
            overflow: 0,
            recycle: 0,
            replenish_in_flight: false,
            stats: PipelineStats::default(),
        }
    }

    pub fn lane_lengths(&self) -> Vec<usize> {
        self.lanes.iter().map(Vec::len).collect()
    }

    /// One-line summary for status logs.
    pub fn summary(&self) -> String {
        format!(
            "state={:?} gen={} lanes={:?} reservoir={} overflow={} recycle={} in_flight={} drains={} fetches={}/{} fallbacks={}/{}/{}",
            self.state,
            self.generation,
            self.lane_lengths(),
            self.reservoir,
            self.overflow,
            self.recycle,
            self.replenish_in_flight,
            self.stats.drains,
            self.stats.fetches_succeeded,
            self.stats.fetches_started,
            self.stats.fallback_overflow,
            self.stats.fallback_recycle,
            self.stats.fallback_exhausted,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PipelineSnapshot::empty(3);
        assert_eq!(snapshot.state, PipelineState::Uninitialized);
        assert_eq!(snapshot.lane_lengths(), vec![0, 0, 0]);
        assert!(snapshot.summary().contains("lanes=[0, 0, 0]"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(PipelineSnapshot::empty(1)).unwrap();
        assert_eq!(json["state"], "uninitialized");
        assert_eq!(json["stats"]["drains"], 0);
    }
}
