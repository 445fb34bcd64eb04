use crate::text::{split_lines, strip_cr};

/// Display math blocks delimited by `$$`.
///
/// Three opener shapes are recognized:
/// - a bare `$$` line closed by a later line ending in `$$`
/// - a single line `$$...$$`
/// - `$$content` closed by a later line ending in `$$`
pub struct MathBlock;

/// A closed math block: its last line and the math between the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathMatch {
    pub end_line: usize,
    pub content: String,
}

impl MathBlock {
    pub const DELIM: &'static str = "$$";

    /// Detects a closed math block opening at `start`.
    ///
    /// Unclosed blocks yield `None` and consume nothing.
    pub fn detect<S: AsRef<str>>(lines: &[S], start: usize) -> Option<MathMatch> {
        let opener = lines.get(start)?.as_ref().trim();
        if !opener.starts_with(Self::DELIM) {
            return None;
        }

        if opener == Self::DELIM {
            let mut content = String::new();
            for (idx, line) in lines.iter().enumerate().skip(start + 1) {
                let text = line.as_ref();
                if let Some(payload) = Self::closing_payload(text) {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(payload);
                    return Some(Self::finish(idx, content));
                }
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(strip_cr(text));
            }
            return None;
        }

        if opener.ends_with(Self::DELIM) {
            let inner = opener
                .get(Self::DELIM.len()..opener.len() - Self::DELIM.len())
                .unwrap_or("");
            return Some(Self::finish(start, inner.trim().to_string()));
        }

        let mut content = opener[Self::DELIM.len()..].to_string();
        for (idx, line) in lines.iter().enumerate().skip(start + 1) {
            let text = line.as_ref();
            content.push('\n');
            if let Some(payload) = Self::closing_payload(text) {
                content.push_str(payload);
                return Some(Self::finish(idx, content));
            }
            content.push_str(strip_cr(text));
        }
        None
    }

    /// Math content of a region's raw text.
    ///
    /// Raw text that no longer parses as a closed block (after a user edit)
    /// falls back to the text with outer delimiters stripped.
    pub fn content_of(raw: &str) -> String {
        let lines = split_lines(raw);
        if let Some(m) = Self::detect(&lines, 0) {
            return m.content;
        }
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix(Self::DELIM).unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix(Self::DELIM).unwrap_or(trimmed);
        split_lines(trimmed.trim())
            .into_iter()
            .map(strip_cr)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn closing_payload(line: &str) -> Option<&str> {
        let trimmed = line.trim();
        trimmed.strip_suffix(Self::DELIM)
    }

    fn finish(end_line: usize, content: String) -> MathMatch {
        MathMatch {
            end_line,
            content: content.trim().to_string(),
        }
    }
}
