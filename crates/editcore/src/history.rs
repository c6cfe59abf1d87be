use std::collections::VecDeque;

use crate::buffer::Buffer;

/// Default number of snapshots kept before the oldest are evicted.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Linear undo/redo history over buffer snapshots.
///
/// The history is never empty and `pointer` always indexes a valid entry.
/// Pushing after an undo drops everything past the pointer, so there is no
/// branching.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Buffer>,
    pointer: usize,
    limit: usize,
}

impl History {
    pub fn new(initial: Buffer) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(initial: Buffer, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            pointer: 0,
            limit: limit.max(1),
        }
    }

    /// Record `value` as the newest entry.
    ///
    /// Returns `false` without touching anything when `value` equals the
    /// current entry.
    pub fn push(&mut self, value: Buffer) -> bool {
        if self.entries[self.pointer] == value {
            return false;
        }

        self.entries.truncate(self.pointer + 1);
        self.entries.push_back(value);
        self.pointer += 1;

        while self.entries.len() > self.limit {
            self.entries.pop_front();
            self.pointer -= 1;
        }

        true
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Buffer> {
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        Some(&self.entries[self.pointer])
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Buffer> {
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }
        self.pointer += 1;
        Some(&self.entries[self.pointer])
    }

    pub fn current(&self) -> &Buffer {
        &self.entries[self.pointer]
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Forget everything and start over from `value`.
    pub fn reset(&mut self, value: Buffer) {
        self.entries.clear();
        self.entries.push_back(value);
        self.pointer = 0;
    }
}
