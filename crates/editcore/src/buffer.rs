use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// One version of the document text.
///
/// Edits never mutate a `Buffer` in place; they produce a new value. Clones
/// share the underlying rope nodes, so keeping many versions in history is
/// cheap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length in chars. All offsets in this crate are char offsets.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.rope.get_char(idx)
    }

    /// Text covered by `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.rope.slice(start..end).to_string()
    }

    /// A new buffer with `range` replaced by `text`.
    pub fn splice(&self, range: Range<usize>, text: &str) -> Buffer {
        let mut rope = self.rope.clone();
        if range.start < range.end {
            rope.remove(range.clone());
        }
        if !text.is_empty() {
            rope.insert(range.start, text);
        }
        Buffer { rope }
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn char_to_line(&self, idx: usize) -> usize {
        self.rope.char_to_line(idx.min(self.len_chars()))
    }

    pub fn line_to_char(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }

    /// Chars on `line`, not counting its line break.
    pub fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(slice) => {
                let len = slice.len_chars();
                if len == 0 || !is_line_break(slice.char(len - 1)) {
                    return len;
                }
                if len > 1 && slice.char(len - 1) == '\n' && slice.char(len - 2) == '\r' {
                    len - 2
                } else {
                    len - 1
                }
            }
            None => 0,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }
}

// Matches ropey's default line-break set.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl From<String> for Buffer {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Rope> for Buffer {
    fn from(rope: Rope) -> Self {
        Self { rope }
    }
}

impl PartialEq<str> for Buffer {
    fn eq(&self, other: &str) -> bool {
        self.rope == other
    }
}

impl PartialEq<&str> for Buffer {
    fn eq(&self, other: &&str) -> bool {
        self.rope == *other
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({:?})", self.to_string())
    }
}
