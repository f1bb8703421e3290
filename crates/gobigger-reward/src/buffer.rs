//! Fixed-capacity FIFO buffers for sliding windows and event queues

use std::collections::VecDeque;

/// Ring buffer that evicts its oldest entry on overflow
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    /// Buffer storage
    buffer: VecDeque<T>,
    /// Maximum capacity
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer; a zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push an entry, returning the evicted oldest entry if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.buffer.len() >= self.capacity {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(item);
        evicted
    }

    /// Oldest entry
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.buffer.front()
    }

    /// Remove and return the oldest entry
    pub fn pop_front(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    /// Remove leading entries while `pred` holds, returning how many were removed
    pub fn drain_front_while(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        while self.buffer.front().is_some_and(&mut pred) {
            self.buffer.pop_front();
            removed += 1;
        }
        removed
    }

    /// Keep only the entries for which `keep` holds
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.buffer.retain(keep);
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.buffer.iter()
    }

    /// Get the current size of the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if buffer holds `capacity` entries
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
