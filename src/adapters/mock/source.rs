//! Mock item source for testing.
//!
//! Returns scripted results in order and falls back to generating items on
//! demand. Requests are recorded so tests can assert exactly how many
//! fetches the pipeline issued, and a gate can hold fetches pending to
//! exercise single-flight behaviour.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::SourceError;
use crate::models::Item;
use crate::traits::ItemSource;

/// Configuration for one scripted fetch.
#[derive(Debug, Clone)]
pub enum MockBatch {
    /// Return these items
    Items(Vec<Item>),
    /// Fail the request
    Failure(SourceError),
}

/// Mock item source.
///
/// # Example
///
/// ```ignore
/// use lanefeed::adapters::mock::MockItemSource;
///
/// let source = MockItemSource::new();
/// source.push_failure(SourceError::RateLimited);
///
/// assert!(source.fetch_batch(40).await.is_err());
/// assert_eq!(source.fetch_batch(2).await.unwrap().len(), 2);
/// assert_eq!(source.requests(), vec![40, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct MockItemSource {
    /// Scripted results, consumed front first
    script: Arc<Mutex<VecDeque<MockBatch>>>,
    /// Failure returned once the script is empty, instead of generating
    offline: Arc<Mutex<Option<SourceError>>>,
    /// Requested counts, in order
    requests: Arc<Mutex<Vec<usize>>>,
    /// Counter for generated ids
    generated: Arc<Mutex<usize>>,
    /// Fetches wait while the gate is closed
    gate: Arc<watch::Sender<bool>>,
}

impl MockItemSource {
    /// Create a source that generates as many items as requested.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            offline: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            generated: Arc::new(Mutex::new(0)),
            gate: Arc::new(gate),
        }
    }

    /// Create a source whose every unscripted fetch fails.
    pub fn offline(err: SourceError) -> Self {
        let source = Self::new();
        source.set_offline(Some(err));
        source
    }

    /// Queue a successful batch.
    pub fn push_items(&self, items: Vec<Item>) {
        self.script.lock().unwrap().push_back(MockBatch::Items(items));
    }

    /// Queue a failed fetch.
    pub fn push_failure(&self, err: SourceError) {
        self.script.lock().unwrap().push_back(MockBatch::Failure(err));
    }

    /// Fail every unscripted fetch with `err`, or go back to generating.
    pub fn set_offline(&self, err: Option<SourceError>) {
        *self.offline.lock().unwrap() = err;
    }

    /// Hold all fetches pending until [`MockItemSource::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let pending and future fetches complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Requested batch sizes, in order.
    pub fn requests(&self) -> Vec<usize> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn generate(&self, count: usize) -> Vec<Item> {
        let mut next = self.generated.lock().unwrap();
        let items = (*next..*next + count)
            .map(|n| Item::new(format!("mock-{n}"), format!("mock://image/{n}")))
            .collect();
        *next += count;
        items
    }
}

impl Default for MockItemSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemSource for MockItemSource {
    async fn fetch_batch(&self, count: usize) -> Result<Vec<Item>, SourceError> {
        self.requests.lock().unwrap().push(count);

        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(SourceError::Cancelled);
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(MockBatch::Items(items)) => Ok(items),
            Some(MockBatch::Failure(err)) => Err(err),
            None => {
                let offline = self.offline.lock().unwrap().clone();
                match offline {
                    Some(err) => Err(err),
                    None => Ok(self.generate(count)),
                }
            }
        }
    }
}
