//! Manually driven exit detector.
//!
//! Tests and custom renderers push [`ExitEvent`]s into the returned sender;
//! the detector forwards them to the pipeline once started.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::traits::{ExitDetector, ExitEvent};

pub struct ChannelExitDetector {
    incoming: mpsc::UnboundedReceiver<ExitEvent>,
}

impl ChannelExitDetector {
    /// Create a detector and the sender that feeds it.
    pub fn new() -> (Self, mpsc::UnboundedSender<ExitEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { incoming: rx }, tx)
    }
}

impl ExitDetector for ChannelExitDetector {
    fn start(self: Box<Self>, events: mpsc::UnboundedSender<ExitEvent>) -> JoinHandle<()> {
        let mut incoming = self.incoming;
        tokio::spawn(async move {
            while let Some(event) = incoming.recv().await {
                if events.send(event).is_err() {
                    break;
                }
            }
        })
    }
}
