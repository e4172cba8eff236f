//! The supply pipeline.
//!
//! Fresh items flow from the reservoir (or the overflow buffer) into lane 0,
//! cascade lane by lane as items scroll out, and end up in the recycle pool
//! after leaving the last lane. [`PipelineController`] owns that state and
//! is purely synchronous; [`PipelineRuntime`] drives it from exit events and
//! network completions.

mod bootstrap;
mod controller;
mod lanes;
mod recycle;
mod runtime;
mod snapshot;

pub use bootstrap::{bootstrap, Seed};
pub use controller::{PipelineController, RefillSource, ReplenishOutcome, ReplenishTicket};
pub use lanes::LaneQueues;
pub use recycle::RecyclePool;
pub use runtime::{PipelineHandle, PipelineRuntime};
pub use snapshot::{PipelineSnapshot, PipelineState, PipelineStats};
