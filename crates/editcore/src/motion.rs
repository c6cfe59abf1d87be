use crate::buffer::Buffer;

/// Caret movements understood by [`target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

/// Where the caret ends up when `motion` is applied from `head`.
///
/// Vertical moves keep the column where the target line is long enough and
/// clamp to its end otherwise.
pub fn target(buffer: &Buffer, head: usize, motion: Motion) -> usize {
    let len = buffer.len_chars();
    let head = head.min(len);
    let line = buffer.char_to_line(head);
    let line_start = buffer.line_to_char(line);
    let column = head - line_start;

    match motion {
        Motion::Left => head.saturating_sub(1),
        Motion::Right => (head + 1).min(len),
        Motion::Up => {
            if line == 0 {
                0
            } else {
                buffer.line_to_char(line - 1) + column.min(buffer.line_len(line - 1))
            }
        }
        Motion::Down => {
            if line + 1 >= buffer.len_lines() {
                len
            } else {
                buffer.line_to_char(line + 1) + column.min(buffer.line_len(line + 1))
            }
        }
        Motion::LineStart => line_start,
        Motion::LineEnd => line_start + buffer.line_len(line),
        Motion::DocumentStart => 0,
        Motion::DocumentEnd => len,
    }
}
