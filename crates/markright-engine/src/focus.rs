//! # Focus Mode
//!
//! Dims everything outside the block the caret is in. The focused block is
//! either the surrounding paragraph (bounded by blank lines) or the
//! surrounding heading section.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::overlay::kinds::Heading;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Off,
    Paragraph,
    Section,
}

impl FocusMode {
    /// `off -> paragraph -> section -> off`.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Paragraph,
            Self::Paragraph => Self::Section,
            Self::Section => Self::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Paragraph => "paragraph",
            Self::Section => "section",
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown focus mode: {0} (expected off, paragraph or section)")]
pub struct UnknownFocusMode(String);

impl FromStr for FocusMode {
    type Err = UnknownFocusMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "paragraph" => Ok(Self::Paragraph),
            "section" => Ok(Self::Section),
            _ => Err(UnknownFocusMode(s.to_string())),
        }
    }
}

/// Inclusive span of line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The focused span and the spans to dim around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusView {
    pub focus: LineSpan,
    pub dimmed: Vec<LineSpan>,
}

/// Focused line span for `caret_line`, `None` when focus mode is off or
/// the document is empty.
pub fn focus_range<S: AsRef<str>>(
    mode: FocusMode,
    lines: &[S],
    caret_line: usize,
) -> Option<LineSpan> {
    if lines.is_empty() {
        return None;
    }
    let caret = caret_line.min(lines.len() - 1);
    match mode {
        FocusMode::Off => None,
        FocusMode::Paragraph => Some(paragraph(lines, caret)),
        FocusMode::Section => Some(section(lines, caret)),
    }
}

/// Focus span plus the dimmed spans before and after it.
pub fn focus_view<S: AsRef<str>>(
    mode: FocusMode,
    lines: &[S],
    caret_line: usize,
) -> Option<FocusView> {
    let focus = focus_range(mode, lines, caret_line)?;
    let last = lines.len() - 1;

    let mut dimmed = Vec::new();
    if focus.start > 0 {
        dimmed.push(LineSpan::new(0, focus.start - 1));
    }
    if focus.end < last {
        dimmed.push(LineSpan::new(focus.end + 1, last));
    }
    Some(FocusView { focus, dimmed })
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn paragraph<S: AsRef<str>>(lines: &[S], caret: usize) -> LineSpan {
    let mut start = caret;
    while start > 0 && !is_blank(lines[start - 1].as_ref()) {
        start -= 1;
    }
    let mut end = caret;
    while end + 1 < lines.len() && !is_blank(lines[end + 1].as_ref()) {
        end += 1;
    }
    LineSpan::new(start, end)
}

fn section<S: AsRef<str>>(lines: &[S], caret: usize) -> LineSpan {
    let level = (0..=caret)
        .rev()
        .find_map(|i| Heading::section_level(lines[i].as_ref()))
        .unwrap_or(1);

    let opens_section = |i: &usize| {
        Heading::section_level(lines[*i].as_ref()).is_some_and(|l| l <= level)
    };

    let start = (0..=caret).rev().find(opens_section).unwrap_or(0);
    let end = (caret + 1..lines.len())
        .find(opens_section)
        .map_or(lines.len() - 1, |next| next - 1);
    LineSpan::new(start, end)
}
