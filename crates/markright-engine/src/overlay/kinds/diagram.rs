use crate::text::{split_lines, strip_cr};

/// Fenced ```` ```mermaid ```` diagram blocks.
pub struct DiagramFence;

/// A closed diagram fence: its last line and the code between the fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMatch {
    pub end_line: usize,
    pub code: String,
}

impl DiagramFence {
    pub const FENCE: &'static str = "```";
    pub const LANGUAGE: &'static str = "mermaid";

    /// Whether `line` opens a mermaid fence.
    ///
    /// The language tag is the word right after the fence and must equal
    /// `mermaid` exactly; trailing info after whitespace is allowed.
    pub fn opens(line: &str) -> bool {
        let Some(rest) = line.trim().strip_prefix(Self::FENCE) else {
            return false;
        };
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        &rest[..tag_len] == Self::LANGUAGE
    }

    /// Whether `line` is a bare closing fence.
    pub fn closes(line: &str) -> bool {
        line.trim() == Self::FENCE
    }

    /// Detects a closed diagram fence opening at `start`.
    pub fn detect<S: AsRef<str>>(lines: &[S], start: usize) -> Option<DiagramMatch> {
        if !Self::opens(lines.get(start)?.as_ref()) {
            return None;
        }

        let mut code: Vec<&str> = Vec::new();
        for (idx, line) in lines.iter().enumerate().skip(start + 1) {
            let text = line.as_ref();
            if Self::closes(text) {
                return Some(DiagramMatch {
                    end_line: idx,
                    code: code.join("\n"),
                });
            }
            code.push(strip_cr(text));
        }
        None
    }

    /// Diagram code of a region's raw text.
    ///
    /// Raw text that is no longer a closed fence yields every line after
    /// the first.
    pub fn code_of(raw: &str) -> String {
        let lines = split_lines(raw);
        if let Some(m) = Self::detect(&lines, 0) {
            return m.code;
        }
        lines
            .iter()
            .skip(1)
            .filter(|line| !Self::closes(line))
            .map(|line| strip_cr(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
