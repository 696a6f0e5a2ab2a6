//! Fixed-capacity, newest-first display buffer.
//!
//! [`EventWindow`] is the only place feed items are stored. It never grows
//! past its capacity: every push truncates the tail.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Bounded, newest-first buffer of feed items.
///
/// Pushing a batch prepends it (the batch keeps its internal order, so the
/// first item of the batch becomes the front of the window) and drops the
/// oldest items until `len() <= capacity()`.
#[derive(Debug, Clone)]
pub struct EventWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> EventWindow<T> {
    /// Creates an empty window holding at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends `batch` and truncates the tail to the capacity.
    ///
    /// An empty batch is a no-op.
    pub fn push(&mut self, batch: Vec<T>) {
        for item in batch.into_iter().take(self.capacity).rev() {
            self.items.push_front(item);
        }
        self.items.truncate(self.capacity);
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of items currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the window holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of items the window keeps.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent item, if any.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterates newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> EventWindow<T> {
    /// Copies the contents out, newest-first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for EventWindow<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_read_newest_first() {
        let mut window = EventWindow::new(100);
        window.push(vec![100u64]);
        window.push(vec![101]);
        window.push(vec![102]);
        assert_eq!(window.to_vec(), vec![102, 101, 100]);
    }

    #[test]
    fn batch_keeps_internal_order_ahead_of_older_items() {
        let mut window = EventWindow::new(150);
        window.push(vec!["a", "b", "c"]);
        window.push(vec!["d", "e"]);
        assert_eq!(window.to_vec(), vec!["d", "e", "a", "b", "c"]);
        assert_eq!(window.front(), Some(&"d"));
    }

    #[test]
    fn empty_batch_is_noop() {
        let mut window = EventWindow::new(3);
        window.push(vec![1, 2]);
        window.push(Vec::new());
        assert_eq!(window.to_vec(), vec![1, 2]);
    }

    #[test]
    fn tail_is_truncated_to_capacity() {
        let mut window = EventWindow::new(3);
        window.push(vec![1, 2]);
        window.push(vec![3, 4]);
        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![3, 4, 1]);
    }

    #[test]
    fn oversized_batch_keeps_its_leading_items() {
        let mut window = EventWindow::new(2);
        window.push(vec![9]);
        window.push(vec![1, 2, 3, 4]);
        assert_eq!(window.to_vec(), vec![1, 2]);
    }

    #[test]
    fn holds_most_recent_items_for_any_push_sequence() {
        let capacity = 5;
        let mut window = EventWindow::new(capacity);
        let mut pushed: Vec<u32> = Vec::new();
        let mut next = 0u32;
        for batch_len in [0usize, 1, 3, 2, 7, 1, 0, 4, 5, 6] {
            let batch: Vec<u32> = (next..next + batch_len as u32).collect();
            next += batch_len as u32;
            let mut expected = batch.clone();
            expected.extend(pushed.iter().copied());
            expected.truncate(capacity);
            window.push(batch);
            pushed = expected;

            assert!(window.len() <= capacity);
            assert_eq!(window.to_vec(), pushed);
        }
    }

    #[test]
    fn clear_empties_window() {
        let mut window = EventWindow::new(4);
        window.push(vec![1, 2, 3]);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 4);
    }

    #[test]
    fn serializes_as_sequence() {
        let mut window = EventWindow::new(4);
        window.push(vec![1, 2]);
        let json = serde_json::to_string(&window).unwrap_or_default();
        assert_eq!(json, "[1,2]");
    }
}
