use crate::buffer::Buffer;
use crate::history::{History, DEFAULT_HISTORY_LIMIT};
use crate::motion::{self, Motion};
use crate::selection::{Selection, SelectionTracker};
use crate::transform::Transform;
use crate::typing;

/// What caused a buffer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Typing, a structural transform or clearing the buffer.
    User,
    /// Undo or redo.
    History,
}

/// Report of a buffer change, handed back to the application so it can
/// re-render and persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub origin: Origin,
    /// Whether the change became a new history entry.
    pub recorded: bool,
}

/// Owns the buffer, the selection and the history, and decides which buffer
/// changes are recorded.
///
/// Undo and redo clear `user_originated` before swapping the buffer in, so
/// the push rule that runs after every change skips them. The flag is reset
/// to `true` once the rule has run.
#[derive(Debug, Clone)]
pub struct EditController {
    buffer: Buffer,
    tracker: SelectionTracker,
    history: History,
    user_originated: bool,
    pending_selection: Option<Selection>,
}

impl EditController {
    pub fn new(initial: Buffer) -> Self {
        Self::with_history_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(initial: Buffer, limit: usize) -> Self {
        let caret = initial.len_chars();
        Self {
            history: History::with_limit(initial.clone(), limit),
            buffer: initial,
            tracker: SelectionTracker::new(Selection::caret(caret)),
            user_originated: true,
            pending_selection: None,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// The selection the presentation should show right now.
    ///
    /// While a transform's selection is pending this is the previous
    /// selection, clamped to the new buffer.
    pub fn selection(&self) -> Selection {
        self.tracker.selection()
    }

    pub fn head(&self) -> usize {
        self.tracker.head()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn pending_selection(&self) -> Option<Selection> {
        self.pending_selection
    }

    /// Second half of a structural edit: called once the presentation has
    /// drawn the new buffer, restores the selection the transform computed.
    pub fn commit_selection(&mut self) -> Option<Selection> {
        let selection = self.pending_selection.take()?;
        let selection = selection.clamp_to(self.buffer.len_chars());
        self.tracker.set(selection);
        log::trace!("Restored selection {:?}", selection);
        Some(selection)
    }

    /// Replace the document outright and start a fresh history. Not an edit.
    pub fn load(&mut self, buffer: Buffer) {
        self.pending_selection = None;
        self.history.reset(buffer.clone());
        self.tracker.collapse_to(buffer.len_chars());
        self.buffer = buffer;
        self.user_originated = true;
    }

    pub fn select(&mut self, selection: Selection) {
        self.commit_selection();
        let len = self.buffer.len_chars();
        self.tracker.set(selection.clamp_to(len));
    }

    /// Move the caret, or extend the selection when `extend` is set.
    pub fn move_caret(&mut self, motion: Motion, extend: bool) {
        self.commit_selection();
        let selection = self.tracker.selection();

        // A plain arrow on a range collapses to the matching edge.
        if !extend && !selection.is_caret() {
            match motion {
                Motion::Left => return self.tracker.collapse_to(selection.start),
                Motion::Right => return self.tracker.collapse_to(selection.end),
                _ => {}
            }
        }

        let target = motion::target(&self.buffer, self.tracker.head(), motion);
        if extend {
            self.tracker.extend_to(target);
        } else {
            self.tracker.collapse_to(target);
        }
    }

    /// A raw text-replacement edit: the whole buffer and selection as the
    /// presentation now has them.
    pub fn replace(&mut self, buffer: Buffer, selection: Selection) -> Option<Change> {
        self.commit_selection();
        if buffer == self.buffer {
            self.tracker.set(selection.clamp_to(buffer.len_chars()));
            return None;
        }
        self.user_originated = true;
        let selection = selection.clamp_to(buffer.len_chars());
        self.set_buffer(buffer);
        self.tracker.set(selection);
        Some(self.record())
    }

    pub fn type_text(&mut self, text: &str) -> Option<Change> {
        self.commit_selection();
        let (buffer, selection) = typing::insert_text(&self.buffer, self.selection(), text);
        self.replace(buffer, selection)
    }

    pub fn delete_backward(&mut self) -> Option<Change> {
        self.commit_selection();
        let (buffer, selection) = typing::delete_backward(&self.buffer, self.selection())?;
        self.replace(buffer, selection)
    }

    pub fn delete_forward(&mut self) -> Option<Change> {
        self.commit_selection();
        let (buffer, selection) = typing::delete_forward(&self.buffer, self.selection())?;
        self.replace(buffer, selection)
    }

    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str) -> Option<Change> {
        self.apply(&Transform::wrap(prefix, suffix))
    }

    pub fn insert_block(&mut self, block: &str) -> Option<Change> {
        self.apply(&Transform::block(block))
    }

    pub fn insert_at_caret(&mut self, literal: &str) -> Option<Change> {
        self.apply(&Transform::insert(literal))
    }

    /// Run a structural transform. The buffer changes now; the new selection
    /// waits for [`commit_selection`](Self::commit_selection).
    pub fn apply(&mut self, op: &Transform) -> Option<Change> {
        self.commit_selection();
        let (buffer, selection) = op.apply(&self.buffer, self.selection());
        log::debug!("Applying {:?}", op);

        self.user_originated = true;
        let changed = buffer != self.buffer;
        self.set_buffer(buffer);
        self.pending_selection = Some(selection);
        changed.then(|| self.record())
    }

    /// Clear the whole document as a recorded edit.
    pub fn clear(&mut self) -> Option<Change> {
        self.commit_selection();
        if self.buffer.is_empty() {
            return None;
        }
        self.user_originated = true;
        self.set_buffer(Buffer::new());
        self.tracker.collapse_to(0);
        Some(self.record())
    }

    /// Step back in history. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Change> {
        self.commit_selection();
        let previous = self.history.undo()?.clone();
        log::debug!("Undo to entry {}", self.history.pointer());
        self.navigate(previous)
    }

    /// Step forward in history. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<Change> {
        self.commit_selection();
        let next = self.history.redo()?.clone();
        log::debug!("Redo to entry {}", self.history.pointer());
        self.navigate(next)
    }

    fn navigate(&mut self, buffer: Buffer) -> Option<Change> {
        self.user_originated = false;
        let head = self.tracker.head();
        self.set_buffer(buffer);
        self.tracker.collapse_to(head.min(self.buffer.len_chars()));
        Some(self.record())
    }

    fn set_buffer(&mut self, buffer: Buffer) {
        self.buffer = buffer;
        self.tracker.clamp_to(self.buffer.len_chars());
    }

    // Runs once after every buffer change.
    fn record(&mut self) -> Change {
        let origin = if self.user_originated {
            Origin::User
        } else {
            Origin::History
        };
        let recorded = self.user_originated && self.history.push(self.buffer.clone());
        self.user_originated = true;

        Change { origin, recorded }
    }
}

impl Default for EditController {
    fn default() -> Self {
        Self::new(Buffer::new())
    }
}
