//! Fixed-capacity top-K buffer for delivery-candidate tensors (C6).
//!
//! Not thread-safe by itself; the classifier worker is its only owner.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use camwatch_models::TopKEntry;

const CAPACITY: usize = 5;

/// Wraps [`TopKEntry`] with a reversed score ordering so that
/// [`BinaryHeap`]'s max-at-the-root behavior surfaces the *minimum* score at
/// the root — the entry to evict when the buffer is over capacity.
struct HeapEntry(TopKEntry);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.score == other.0.score
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.score.total_cmp(&self.0.score)
    }
}

pub struct TopKBuffer {
    heap: BinaryHeap<HeapEntry>,
}

impl TopKBuffer {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::with_capacity(CAPACITY),
        }
    }

    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert `entry`. If the buffer now exceeds capacity, the
    /// minimum-score entry is evicted.
    pub fn add(&mut self, entry: TopKEntry) {
        self.heap.push(HeapEntry(entry));
        if self.heap.len() > CAPACITY {
            self.heap.pop();
        }
    }

    /// The current entries, in heap order (not score order).
    pub fn snapshot(&self) -> Vec<TopKEntry> {
        self.heap.iter().map(|e| e.0.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Default for TopKBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: f32) -> TopKEntry {
        TopKEntry::new(vec![], score)
    }

    #[test]
    fn add_below_capacity_keeps_everything() {
        let mut buf = TopKBuffer::new();
        for s in [0.1, 0.2, 0.3] {
            buf.add(entry(s));
        }
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn add_past_capacity_evicts_the_minimum_score() {
        let mut buf = TopKBuffer::new();
        for s in [0.5, 0.6, 0.7, 0.8, 0.9] {
            buf.add(entry(s));
        }
        assert_eq!(buf.len(), 5);
        buf.add(entry(0.1));
        assert_eq!(buf.len(), 5);
        let scores: Vec<f32> = buf.snapshot().iter().map(|e| e.score).collect();
        assert!(!scores.contains(&0.1), "lowest score should have been evicted");
        assert!(scores.contains(&0.5), "higher-scored entries should survive");
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut buf = TopKBuffer::new();
        buf.add(entry(0.5));
        buf.clear();
        assert!(buf.is_empty());
    }
}
