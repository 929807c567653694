//! Bounded undo/redo history

use std::collections::VecDeque;

/// Entries kept before the oldest is dropped
pub const HISTORY_LIMIT: usize = 50;

/// Snapshot history with a movable cursor. Recording after an undo drops
/// the redo tail.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    entries: VecDeque<T>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, HISTORY_LIMIT)
    }

    pub fn with_limit(initial: T, limit: usize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.min(HISTORY_LIMIT));
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn record(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Start over from a single snapshot
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.cursor = 0;
    }

    /// Apply a change to every stored snapshot without moving the cursor
    pub fn update_all(&mut self, mut f: impl FnMut(&mut T)) {
        for entry in self.entries.iter_mut() {
            f(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_after_undo_drops_redo_tail() {
        let mut history = History::new("a");
        history.record("b");
        history.record("c");
        history.undo();
        history.record("d");

        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&"d"));
        assert_eq!(history.undo(), Some(&"b"));
    }

    #[test]
    fn test_trims_oldest_entries() {
        let mut history = History::new(0);
        for i in 1..=60 {
            history.record(i);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);

        let mut oldest = 60;
        while let Some(v) = history.undo() {
            oldest = *v;
        }
        assert_eq!(oldest, 11);
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(1);
        history.record(2);
        history.reset(9);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.current(), Some(&9));
    }
}
