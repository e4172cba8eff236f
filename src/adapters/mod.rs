//! Concrete implementations of trait abstractions.
//!
//! Production adapters for the traits in `crate::traits`, plus test doubles.
//!
//! # Adapters
//!
//! - [`HttpItemSource`] - batches from the image proxy, preloaded
//! - [`TimerExitDetector`] - per-lane timed exits
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockItemSource`] - scripted batches and failures
//! - [`mock::ChannelExitDetector`] - exit events sent by hand

pub mod http_source;
pub mod mock;
pub mod preload;
pub mod timer_exit;

pub use http_source::HttpItemSource;
pub use mock::{ChannelExitDetector, MockItemSource};
pub use preload::Preloader;
pub use timer_exit::TimerExitDetector;
