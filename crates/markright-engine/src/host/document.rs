use xi_rope::delta::{Builder, Transformer};
use xi_rope::{Delta, Rope, RopeInfo};

use super::HostError;
use crate::text::{SourcePosition, SourceRange, rope_lines, slice_to_string, strip_cr, utf16_len, utf16_to_byte};

/// Changes a view or the host can make to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    ReplaceAll { text: String },
    Replace { range: SourceRange, text: String },
    Insert { at: SourcePosition, text: String },
}

/// The authoritative buffer of one open document.
///
/// Text lives in a single `xi_rope::Rope`. Every applied edit that changes
/// the text bumps `version`; edits that would leave the text as it was are
/// dropped without a version change.
#[derive(Debug, Clone)]
pub struct Document {
    buffer: Rope,
    /// Caret as a byte offset into `buffer`
    cursor: usize,
    version: u64,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            cursor: 0,
            version: 0,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Lines split on `\n`, carriage returns kept.
    pub fn lines(&self) -> Vec<String> {
        rope_lines(&self.buffer)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_of_offset(self.buffer.len()) + 1
    }

    /// Byte range of `line` without its line terminator.
    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let start = self.buffer.offset_of_line(line);
        let end = if line + 1 < self.line_count() {
            self.buffer.offset_of_line(line + 1) - 1
        } else {
            self.buffer.len()
        };
        (start, end)
    }

    /// Byte offset for `pos`. Lines past the end map to the end of the
    /// buffer, columns past the end of a line to the end of that line.
    pub fn offset_of(&self, pos: SourcePosition) -> usize {
        if pos.line >= self.line_count() {
            return self.buffer.len();
        }
        self.column_offset(pos)
    }

    /// Like [`Document::offset_of`] but rejects lines that do not exist.
    pub fn checked_offset(&self, pos: SourcePosition) -> Result<usize, HostError> {
        if pos.line >= self.line_count() {
            return Err(HostError::PositionOutOfRange {
                position: pos,
                lines: self.line_count(),
            });
        }
        Ok(self.column_offset(pos))
    }

    fn column_offset(&self, pos: SourcePosition) -> usize {
        let (start, end) = self.line_bounds(pos.line);
        let line = slice_to_string(&self.buffer, start..end);
        start + utf16_to_byte(strip_cr(&line), pos.character)
    }

    /// Line/character position of byte `offset`, clamped to the buffer.
    pub fn position_of(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.buffer.len());
        let line = self.buffer.line_of_offset(offset);
        let start = self.buffer.offset_of_line(line);
        let before = slice_to_string(&self.buffer, start..offset);
        SourcePosition::new(line, utf16_len(&before))
    }

    pub fn text_in(&self, range: SourceRange) -> String {
        slice_to_string(&self.buffer, self.offset_of(range.start)..self.offset_of(range.end))
    }

    pub fn cursor(&self) -> SourcePosition {
        self.position_of(self.cursor)
    }

    pub fn set_cursor(&mut self, pos: SourcePosition) {
        self.cursor = self.offset_of(pos);
    }

    /// Applies `edit`, returning the new version if the text changed.
    pub fn apply(&mut self, edit: Edit) -> Result<Option<u64>, HostError> {
        let (range, text) = match edit {
            Edit::ReplaceAll { text } => (0..self.buffer.len(), text),
            Edit::Replace { range, text } => {
                let start = self.checked_offset(range.start)?;
                let end = self.offset_of(range.end);
                if range.start > range.end || start > end {
                    return Err(HostError::InvalidRange { range });
                }
                (start..end, text)
            }
            Edit::Insert { at, text } => {
                let at = self.checked_offset(at)?;
                (at..at, text)
            }
        };

        if slice_to_string(&self.buffer, range.clone()) == text {
            return Ok(None);
        }

        let delta = self.compile(range, &text);
        self.cursor = Transformer::new(&delta).transform(self.cursor, true);
        self.buffer = delta.apply(&self.buffer);
        self.version += 1;
        Ok(Some(self.version))
    }

    fn compile(&self, range: std::ops::Range<usize>, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range, Rope::from(text));
        builder.build()
    }
}
