//! Initial supply for a new pipeline.
//!
//! One request fetches enough items to fill every lane plus a reserve for
//! the overflow buffer; the batch is then split in two.

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::models::Item;
use crate::traits::ItemSource;

/// Items to seed a pipeline with.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    /// Reservoir contents, sized to fill all lanes
    pub initial: Vec<Item>,
    /// Overflow buffer contents
    pub buffer: Vec<Item>,
}

impl Seed {
    /// Split a batch: the first `initial_total` items seed the reservoir,
    /// the rest the overflow buffer.
    pub fn split(mut items: Vec<Item>, initial_total: usize) -> Self {
        let buffer = if items.len() > initial_total {
            items.split_off(initial_total)
        } else {
            Vec::new()
        };
        Self {
            initial: items,
            buffer,
        }
    }

    pub fn len(&self) -> usize {
        self.initial.len() + self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty() && self.buffer.is_empty()
    }
}

/// Fetch the seed for a new pipeline.
///
/// A failed request is returned to the caller; there is nothing to fall
/// back on before the first batch.
pub async fn bootstrap(
    source: &dyn ItemSource,
    config: &PipelineConfig,
) -> Result<Seed, SourceError> {
    let initial_total = config.initial_total();
    let requested = initial_total + config.bootstrap_buffer;

    let mut items = source.fetch_batch(requested).await?;
    items.truncate(requested);
    let seed = Seed::split(items, initial_total);

    info!(
        requested,
        initial = seed.initial.len(),
        buffer = seed.buffer.len(),
        "Bootstrap batch received"
    );
    Ok(seed)
}
