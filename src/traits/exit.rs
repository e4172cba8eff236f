//! Exit detector trait abstraction.
//!
//! Whatever decides that an item has left a lane's viewport (viewport
//! intersection, a timer, a scroll offset) reports it as an [`ExitEvent`].
//! The detector only signals; it never touches lane contents.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::ItemId;

/// "An item left lane `lane`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEvent {
    /// Lane the item left
    pub lane: usize,
    /// The departing item, when the detector knows it
    pub item_id: Option<ItemId>,
}

impl ExitEvent {
    pub fn new(lane: usize) -> Self {
        Self {
            lane,
            item_id: None,
        }
    }

    pub fn with_item(lane: usize, item_id: impl Into<ItemId>) -> Self {
        Self {
            lane,
            item_id: Some(item_id.into()),
        }
    }
}

/// Source of exit events.
///
/// Events within one lane must arrive in queue order (head first); no
/// ordering is assumed across lanes. Each event triggers exactly one drain.
pub trait ExitDetector: Send + 'static {
    /// Start emitting events into `events`.
    ///
    /// # Returns
    /// A JoinHandle that can be used to abort the detector on shutdown.
    fn start(self: Box<Self>, events: mpsc::UnboundedSender<ExitEvent>) -> JoinHandle<()>;
}
