use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A caret or highlighted range, in char offsets into the buffer.
///
/// `start <= end` always holds; `start == end` is a plain caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a selection from two offsets in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Build a selection from untrusted offsets, ordering them and clamping
    /// both into `0..=len`.
    pub fn clamped(a: usize, b: usize, len: usize) -> Self {
        Self::new(a.min(len), b.min(len))
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn clamp_to(self, len: usize) -> Self {
        Self::clamped(self.start, self.end, len)
    }
}

/// Current selection plus the anchor that shift-motions extend from.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selection: Selection,
    anchor: usize,
    head: usize,
}

impl SelectionTracker {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            anchor: selection.start,
            head: selection.end,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The end of the selection that moves with the caret.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn set(&mut self, selection: Selection) {
        self.selection = selection;
        self.anchor = selection.start;
        self.head = selection.end;
    }

    pub fn collapse_to(&mut self, pos: usize) {
        self.set(Selection::caret(pos));
    }

    /// Move the head to `head`, keeping the anchor where it is.
    pub fn extend_to(&mut self, head: usize) {
        self.head = head;
        self.selection = Selection::new(self.anchor, head);
    }

    pub fn clamp_to(&mut self, len: usize) {
        self.anchor = self.anchor.min(len);
        self.head = self.head.min(len);
        self.selection = self.selection.clamp_to(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_offsets() {
        let sel = Selection::new(7, 2);
        assert_eq!(sel, Selection { start: 2, end: 7 });
        assert_eq!(sel.len(), 5);
        assert!(!sel.is_caret());
    }

    #[test]
    fn test_clamped_keeps_offsets_in_bounds() {
        let sel = Selection::clamped(40, 3, 10);
        assert_eq!(sel, Selection::new(3, 10));

        let sel = Selection::clamped(50, 60, 10);
        assert_eq!(sel, Selection::caret(10));
    }

    #[test]
    fn test_tracker_extends_from_anchor() {
        let mut tracker = SelectionTracker::new(Selection::caret(5));
        tracker.extend_to(9);
        assert_eq!(tracker.selection(), Selection::new(5, 9));

        // Moving the head back past the anchor flips the range.
        tracker.extend_to(2);
        assert_eq!(tracker.selection(), Selection::new(2, 5));
        assert_eq!(tracker.head(), 2);
        assert_eq!(tracker.anchor(), 5);
    }

    #[test]
    fn test_tracker_collapse_resets_anchor() {
        let mut tracker = SelectionTracker::new(Selection::new(1, 4));
        tracker.collapse_to(8);
        tracker.extend_to(6);
        assert_eq!(tracker.selection(), Selection::new(6, 8));
    }

    #[test]
    fn test_tracker_clamp_to_shorter_buffer() {
        let mut tracker = SelectionTracker::new(Selection::new(3, 12));
        tracker.clamp_to(5);
        assert_eq!(tracker.selection(), Selection::new(3, 5));
        assert_eq!(tracker.head(), 5);
    }
}
