//! Lanefeed - an endless multi-lane image feed.
//!
//! The core is the supply pipeline in [`pipeline`]: it keeps every lane at
//! depth, replenishes its reservoir from an [`traits::ItemSource`] before it
//! runs dry, and falls back to buffered or recycled items when the source
//! is unavailable.

pub mod adapters;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prelude;
pub mod startup;
pub mod traits;
