//! Lane queue storage.
//!
//! Plain ordered queues, one per lane. The fill and cascade policy lives in
//! the controller; this type only guards indices.

use std::collections::VecDeque;

use crate::models::Item;

#[derive(Debug)]
pub struct LaneQueues {
    lanes: Vec<VecDeque<Item>>,
}

impl LaneQueues {
    pub fn new(lane_count: usize, target_depth: usize) -> Self {
        Self {
            lanes: (0..lane_count)
                .map(|_| VecDeque::with_capacity(target_depth + 1))
                .collect(),
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Length of a lane; zero for an index out of range.
    pub fn len(&self, lane: usize) -> usize {
        self.lanes.get(lane).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, lane: usize) -> bool {
        self.len(lane) == 0
    }

    pub fn head(&self, lane: usize) -> Option<&Item> {
        self.lanes.get(lane).and_then(VecDeque::front)
    }

    pub fn pop_front(&mut self, lane: usize) -> Option<Item> {
        self.lanes.get_mut(lane).and_then(VecDeque::pop_front)
    }

    pub fn push_back(&mut self, lane: usize, item: Item) {
        if let Some(queue) = self.lanes.get_mut(lane) {
            queue.push_back(item);
        }
    }

    /// Items of a lane, head first.
    pub fn iter(&self, lane: usize) -> impl Iterator<Item = &Item> {
        self.lanes.get(lane).into_iter().flatten()
    }

    pub fn total_len(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    pub fn clear(&mut self) {
        self.lanes.iter_mut().for_each(VecDeque::clear);
    }
}
