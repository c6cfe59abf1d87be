//! Raw keystroke edits.

use crate::buffer::Buffer;
use crate::selection::Selection;

/// Replace the selection with typed text.
pub fn insert_text(buffer: &Buffer, selection: Selection, text: &str) -> (Buffer, Selection) {
    let caret = selection.start + text.chars().count();
    (
        buffer.splice(selection.range(), text),
        Selection::caret(caret),
    )
}

/// Backspace: remove the selection, or the char before the caret.
///
/// Returns `None` when there is nothing to delete.
pub fn delete_backward(buffer: &Buffer, selection: Selection) -> Option<(Buffer, Selection)> {
    if !selection.is_caret() {
        return Some(remove(buffer, selection));
    }
    if selection.start == 0 {
        return None;
    }
    Some(remove(buffer, Selection::new(selection.start - 1, selection.start)))
}

/// Delete: remove the selection, or the char after the caret.
pub fn delete_forward(buffer: &Buffer, selection: Selection) -> Option<(Buffer, Selection)> {
    if !selection.is_caret() {
        return Some(remove(buffer, selection));
    }
    if selection.start >= buffer.len_chars() {
        return None;
    }
    Some(remove(buffer, Selection::new(selection.start, selection.start + 1)))
}

fn remove(buffer: &Buffer, range: Selection) -> (Buffer, Selection) {
    (buffer.splice(range.range(), ""), Selection::caret(range.start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_text_replaces_selection() {
        let (out, sel) = insert_text(&Buffer::from("abc"), Selection::new(1, 2), "XY");
        assert_eq!(out, "aXYc");
        assert_eq!(sel, Selection::caret(3));
    }

    #[test]
    fn test_delete_backward() {
        let buffer = Buffer::from("abc");
        let (out, sel) = delete_backward(&buffer, Selection::caret(2)).unwrap();
        assert_eq!(out, "ac");
        assert_eq!(sel, Selection::caret(1));

        assert!(delete_backward(&buffer, Selection::caret(0)).is_none());

        let (out, sel) = delete_backward(&buffer, Selection::new(0, 3)).unwrap();
        assert_eq!(out, "");
        assert_eq!(sel, Selection::caret(0));
    }

    #[test]
    fn test_delete_forward() {
        let buffer = Buffer::from("abc");
        let (out, sel) = delete_forward(&buffer, Selection::caret(0)).unwrap();
        assert_eq!(out, "bc");
        assert_eq!(sel, Selection::caret(0));

        assert!(delete_forward(&buffer, Selection::caret(3)).is_none());
    }
}
