//! Structural markup edits.
//!
//! Every function here is pure: it takes the current buffer and selection
//! and returns the edited buffer with the selection the caller should show
//! next. Selections must already satisfy `end <= buffer.len_chars()`.

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::selection::Selection;

/// A structural edit with its literal markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Frame the selection with `prefix` and `suffix`.
    Wrap { prefix: String, suffix: String },
    /// Put a block on its own line at the caret.
    Block(String),
    /// Replace the selection with a literal.
    Insert(String),
}

impl Transform {
    pub fn wrap(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Transform::Wrap {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn block(text: impl Into<String>) -> Self {
        Transform::Block(text.into())
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Transform::Insert(text.into())
    }

    pub fn apply(&self, buffer: &Buffer, selection: Selection) -> (Buffer, Selection) {
        match self {
            Transform::Wrap { prefix, suffix } => wrap_selection(buffer, selection, prefix, suffix),
            Transform::Block(block) => insert_block(buffer, selection, block),
            Transform::Insert(literal) => insert_at_caret(buffer, selection, literal),
        }
    }
}

/// Surround the selected text with `prefix` and `suffix`.
///
/// The returned selection covers the original text at its new offsets, so a
/// selected word stays selected between the new markers. With a bare caret
/// both markers are inserted and the caret sits between them.
pub fn wrap_selection(
    buffer: &Buffer,
    selection: Selection,
    prefix: &str,
    suffix: &str,
) -> (Buffer, Selection) {
    debug_assert!(selection.end <= buffer.len_chars());

    let shift = prefix.chars().count();
    let wrapped = buffer
        .splice(selection.end..selection.end, suffix)
        .splice(selection.start..selection.start, prefix);

    (
        wrapped,
        Selection::new(selection.start + shift, selection.end + shift),
    )
}

/// Insert `block` at the selection start so that it occupies whole lines.
///
/// A newline is added before the block when the preceding char exists and is
/// not a newline, and after it when the following char exists and is not a
/// newline. Any selected range is left in place, not replaced. The caret
/// lands right after the padded block.
pub fn insert_block(buffer: &Buffer, selection: Selection, block: &str) -> (Buffer, Selection) {
    debug_assert!(selection.start <= buffer.len_chars());

    let at = selection.start;
    let mut padded = String::with_capacity(block.len() + 2);

    if at > 0 && buffer.char_at(at - 1).is_some_and(|c| c != '\n') {
        padded.push('\n');
    }
    padded.push_str(block);
    if buffer.char_at(at).is_some_and(|c| c != '\n') {
        padded.push('\n');
    }

    let caret = at + padded.chars().count();
    (buffer.splice(at..at, &padded), Selection::caret(caret))
}

/// Replace the selection with `literal`, leaving the caret right after it.
pub fn insert_at_caret(buffer: &Buffer, selection: Selection, literal: &str) -> (Buffer, Selection) {
    debug_assert!(selection.end <= buffer.len_chars());

    let caret = selection.start + literal.chars().count();
    (
        buffer.splice(selection.range(), literal),
        Selection::caret(caret),
    )
}
