//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lanefeed::prelude::*;
//! ```

// Configuration
pub use crate::config::{ExitConfig, FeedConfig, PipelineConfig, SourceConfig};

// Errors
pub use crate::error::{FeedError, FeedResult, SourceError};

// Model types
pub use crate::models::{ImagePayload, Item, ItemDescriptor, ItemId};

// Pipeline
pub use crate::pipeline::{
    PipelineController, PipelineHandle, PipelineRuntime, PipelineSnapshot, PipelineState,
    RefillSource, ReplenishTicket,
};

// Collaborators
pub use crate::adapters::{HttpItemSource, TimerExitDetector};
pub use crate::traits::{ExitDetector, ExitEvent, ItemSource};
