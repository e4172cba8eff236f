//! Data model shared by sources, the pipeline and renderers.

mod descriptor;
mod item;

pub use descriptor::{parse_batch, ItemDescriptor};
pub use item::{ImagePayload, Item, ItemId};
