//! Trait abstractions for the pipeline's collaborators.
//!
//! - [`ItemSource`] - asynchronous batch provider (network, fixtures, mocks)
//! - [`ExitDetector`] - producer of "item left lane" events

pub mod exit;
pub mod source;

pub use exit::{ExitDetector, ExitEvent};
pub use source::ItemSource;
