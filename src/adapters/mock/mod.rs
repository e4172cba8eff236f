//! Mock implementations for testing.
//!
//! Test doubles for the pipeline's collaborators, usable without network
//! access or a renderer.
//!
//! # Available Mocks
//!
//! - [`MockItemSource`] - scripted batches, request log, pending gate
//! - [`ChannelExitDetector`] - exit events pushed by hand

pub mod exit;
pub mod source;

pub use exit::ChannelExitDetector;
pub use source::{MockBatch, MockItemSource};
