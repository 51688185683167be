// src/analysis/history.rs
//
// Bounded, newest-first memory of recent target samples.
// Position and radius live in one entry so they can never drift apart.

use crate::config::BUFFER_SIZE;
use crate::types::{Point, Sample};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<Sample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a sample, evicting the oldest once capacity is exceeded.
    pub fn push(&mut self, sample: Sample) {
        self.entries.push_front(sample);
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.entries.front()
    }

    /// Up to `k` most recent samples, newest first.
    pub fn newest(&self, k: usize) -> impl Iterator<Item = &Sample> + '_ {
        self.entries.iter().take(k)
    }

    /// Up to `k` oldest samples currently held, in buffer order (newest first).
    pub fn oldest(&self, k: usize) -> impl Iterator<Item = &Sample> + '_ {
        self.entries.iter().skip(self.entries.len().saturating_sub(k))
    }

    /// Positions newest first, for trail rendering.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.entries.iter().map(|s| s.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.entries.iter()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
