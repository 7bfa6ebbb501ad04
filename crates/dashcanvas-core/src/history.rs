//! Bounded linear undo/redo history.

use std::collections::VecDeque;

/// A ring buffer of snapshots with a cursor at the current one.
///
/// The newest entry is always the live state. Pushing after an undo drops
/// every entry past the cursor, and the oldest entry is evicted once the
/// buffer holds `capacity` entries.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    index: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Create a history seeded with `initial` as its only entry.
    pub fn new(initial: T, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            capacity,
        }
    }

    /// Record a new current snapshot.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the entry to restore, or `None` at the oldest.
    pub fn undo(&mut self) -> Option<T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).cloned()
    }

    /// Step forward one entry. Returns the entry to restore, or `None` at the newest.
    pub fn redo(&mut self) -> Option<T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything but `snapshot`.
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.index = 0;
    }
}
