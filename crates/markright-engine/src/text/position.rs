use serde::{Deserialize, Serialize};

/// A point in the document's line/character coordinate system.
///
/// `character` counts UTF-16 code units, which is what editor hosts and
/// webviews report for caret positions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourcePosition {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based UTF-16 offset within the line.
    pub character: usize,
}

impl SourcePosition {
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A range between two [`SourcePosition`]s with `start <= end`.
///
/// Overlay regions always cover whole lines: `start.character` is 0 and
/// `end.character` is the length of the last line.
///
/// Deserializing goes through [`SourceRange::new`], so reversed endpoints
/// from the wire are swapped rather than trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireRange")]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

#[derive(Deserialize)]
struct WireRange {
    start: SourcePosition,
    end: SourcePosition,
}

impl From<WireRange> for SourceRange {
    fn from(wire: WireRange) -> Self {
        Self::new(wire.start, wire.end)
    }
}

impl SourceRange {
    /// Builds a range, swapping the endpoints if they arrive reversed.
    pub fn new(a: SourcePosition, b: SourcePosition) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Range covering lines `start_line..=end_line`, ending at `end_len`.
    pub fn lines(start_line: usize, end_line: usize, end_len: usize) -> Self {
        Self::new(
            SourcePosition::new(start_line, 0),
            SourcePosition::new(end_line, end_len),
        )
    }

    /// Whether `line` falls within `[start.line, end.line]`.
    #[must_use]
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start.line && line <= self.end.line
    }

    /// Whether the position lies inside the range, endpoints included.
    #[must_use]
    pub fn contains(&self, pos: SourcePosition) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Number of lines the range touches.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.end.line - self.start.line + 1
    }

    /// Whether the two ranges share any line.
    #[must_use]
    pub fn overlaps_lines(&self, other: &SourceRange) -> bool {
        self.start.line <= other.end.line && other.start.line <= self.end.line
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Converts a UTF-16 column within `line` to a byte offset.
///
/// Columns past the end clamp to `line.len()`. A column landing inside a
/// surrogate pair rounds up to the next char boundary.
pub fn utf16_to_byte(line: &str, character: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += ch.len_utf16();
    }
    line.len()
}

/// Byte offset of `pos` within `text`, clamped to the text.
///
/// Lines are split on `\n`; a line past the end maps to `text.len()`.
pub fn byte_offset(text: &str, pos: SourcePosition) -> usize {
    let mut line_start = 0;
    for (index, line) in text.split('\n').enumerate() {
        if index == pos.line {
            let line = line.strip_suffix('\r').unwrap_or(line);
            return line_start + utf16_to_byte(line, pos.character);
        }
        line_start += line.len() + 1;
    }
    text.len()
}

/// Position of byte offset `byte` within `text`, clamped to the text.
pub fn position_at(text: &str, byte: usize) -> SourcePosition {
    let mut byte = byte.min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    let before = &text[..byte];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    SourcePosition::new(line, utf16_len(&before[line_start..]))
}
