//! Display-width helpers for placing the caret and the selection in the
//! editor pane.

use editcore::Buffer;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const TAB_WIDTH: usize = 4;

/// Width of one grapheme cluster in terminal cells.
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    if grapheme.chars().all(char::is_control) {
        return 0;
    }
    // Emoji ZWJ sequences report the sum of their parts.
    if grapheme.chars().count() > 1 && grapheme.contains('\u{200d}') {
        return 2;
    }
    grapheme.width().max(1)
}

pub fn str_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Replace tabs with spaces so that rendered text matches `str_width`.
pub fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Row and column (in cells) of the character offset `head`.
pub fn caret_cell(buffer: &Buffer, head: usize) -> (usize, usize) {
    let head = head.min(buffer.len_chars());
    let row = buffer.char_to_line(head);
    let line_start = buffer.line_to_char(row);
    let before = buffer.slice(line_start..head);
    (row, str_width(&before))
}

/// Drop the first `cells` cells of `text`, for horizontal scrolling.
pub fn skip_cells(text: &str, cells: usize) -> String {
    let mut skipped = 0;
    let mut out = String::new();
    for g in text.graphemes(true) {
        if skipped < cells {
            skipped += grapheme_width(g);
            continue;
        }
        out.push_str(g);
    }
    out
}
