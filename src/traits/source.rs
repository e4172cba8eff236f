//! Item source trait abstraction.
//!
//! The pipeline never talks to the network directly. It asks an
//! [`ItemSource`] for a batch and receives either the whole batch or a
//! failure; there is no partial-success contract.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::Item;

/// Asynchronous provider of fully loaded items.
///
/// Implementations own their retry and timeout policy. Every returned item
/// must already be loaded; items whose image could not be loaded are
/// excluded rather than returned as placeholders.
///
/// # Example
///
/// ```ignore
/// use lanefeed::traits::ItemSource;
///
/// async fn top_up<S: ItemSource>(source: &S) -> usize {
///     match source.fetch_batch(40).await {
///         Ok(items) => items.len(),
///         Err(_) => 0,
///     }
/// }
/// ```
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch up to `count` items.
    ///
    /// # Returns
    /// At most `count` loaded items, or an error if the batch failed as a whole
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Item>, SourceError>;
}
