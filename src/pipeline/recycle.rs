//! Bounded pool of previously displayed items.
//!
//! Items leaving the last lane land here, newest at the head. When the pool
//! grows past its capacity the oldest entry falls off the tail. The pool is
//! only read from by the replenishment fallback chain, and reads are random
//! so reused items do not come back in a recognizable order.

use std::collections::VecDeque;

use crate::models::Item;

/// Newest-first pool with oldest-first eviction.
#[derive(Debug)]
pub struct RecyclePool {
    items: VecDeque<Item>,
    capacity: usize,
}

impl RecyclePool {
    /// Create an empty pool. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert at the head.
    ///
    /// # Returns
    /// The evicted oldest item if the pool was over capacity
    pub fn push(&mut self, item: Item) -> Option<Item> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Remove one uniformly chosen entry.
    pub fn take_random(&mut self, rng: &mut fastrand::Rng) -> Option<Item> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.usize(..self.items.len());
        self.items.remove(index)
    }

    /// Shuffle the pool, then remove up to `count` entries from the head.
    pub fn take_shuffled(&mut self, count: usize, rng: &mut fastrand::Rng) -> Vec<Item> {
        rng.shuffle(self.items.make_contiguous());
        let take = count.min(self.items.len());
        self.items.drain(..take).collect()
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
