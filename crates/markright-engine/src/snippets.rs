//! Toolbar and keyboard insertions as plain text transforms.

use crate::wikilink::WikiLink;

/// Text inserted by toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snippet {
    Table,
    Diagram,
}

impl Snippet {
    pub fn text(self) -> &'static str {
        match self {
            Self::Table => {
                "\n| Column 1 | Column 2 | Column 3 |\n|----------|----------|----------|\n| Cell 1   | Cell 2   | Cell 3   |\n| Cell 4   | Cell 5   | Cell 6   |\n"
            }
            Self::Diagram => {
                "\n```mermaid\ngraph TD\n    A[Start] --> B{Is it?}\n    B -->|Yes| C[OK]\n    B -->|No| D[End]\n```\n"
            }
        }
    }
}

pub const DEFAULT_MATH: &str = "E = mc^2";
pub const DEFAULT_LINK_TEXT: &str = "Link Text";
pub const DEFAULT_BOLD: &str = "bold text";
pub const DEFAULT_ITALIC: &str = "italic text";
pub const INDENT: &str = "  ";

/// Result of an insertion: the new text and the byte range to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub text: String,
    pub selection: std::ops::Range<usize>,
}

/// Replaces `selection` in `text` with `snippet`, leaving the caret after it.
pub fn insert_snippet(text: &str, selection: std::ops::Range<usize>, snippet: Snippet) -> Insertion {
    replace_selection(text, selection, snippet.text())
}

fn replace_selection(text: &str, selection: std::ops::Range<usize>, inserted: &str) -> Insertion {
    let (start, end) = clamp(text, selection);
    let caret = start + inserted.len();
    Insertion {
        text: format!("{}{inserted}{}", &text[..start], &text[end..]),
        selection: caret..caret,
    }
}

/// Wraps the selection (or `placeholder`) in `prefix`/`suffix` and selects
/// the wrapped text.
pub fn wrap_selection(
    text: &str,
    selection: std::ops::Range<usize>,
    prefix: &str,
    suffix: &str,
    placeholder: &str,
) -> Insertion {
    let (start, end) = clamp(text, selection);
    let inner = match &text[start..end] {
        "" => placeholder,
        selected => selected,
    };
    let inner_start = start + prefix.len();
    Insertion {
        text: format!("{}{prefix}{inner}{suffix}{}", &text[..start], &text[end..]),
        selection: inner_start..inner_start + inner.len(),
    }
}

/// Inline `$..$` for short selections, a `$$` block for multi-line or long ones.
pub fn insert_math(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    let (start, end) = clamp(text, selection.clone());
    let selected = &text[start..end];
    if selected.contains('\n') || selected.chars().count() > 20 {
        wrap_selection(text, selection, "$$\n", "\n$$", DEFAULT_MATH)
    } else {
        wrap_selection(text, selection, "$", "$", DEFAULT_MATH)
    }
}

/// Wraps the selection in `[[...]]`.
pub fn insert_wiki_link(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    wrap_selection(
        text,
        selection,
        WikiLink::OPEN,
        WikiLink::CLOSE,
        DEFAULT_LINK_TEXT,
    )
}

pub fn insert_bold(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    wrap_selection(text, selection, "**", "**", DEFAULT_BOLD)
}

pub fn insert_italic(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    wrap_selection(text, selection, "*", "*", DEFAULT_ITALIC)
}

/// Replaces the selection with [`INDENT`].
pub fn indent(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    replace_selection(text, selection, INDENT)
}

/// Removes [`INDENT`] from the start of every line the selection touches.
/// Lines indented by less are left alone.
pub fn unindent(text: &str, selection: std::ops::Range<usize>) -> Insertion {
    let (start, end) = clamp(text, selection);
    let first = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let removals: Vec<usize> = std::iter::once(first)
        .chain(text[first..end].match_indices('\n').map(|(i, _)| first + i + 1))
        .filter(|&line_start| text[line_start..].starts_with(INDENT))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for &at in &removals {
        out.push_str(&text[last..at]);
        last = at + INDENT.len();
    }
    out.push_str(&text[last..]);

    let shift = |offset: usize| {
        let removed: usize = removals
            .iter()
            .map(|&at| offset.clamp(at, at + INDENT.len()) - at)
            .sum();
        offset - removed
    };
    Insertion {
        text: out,
        selection: shift(start)..shift(end),
    }
}

/// Clamps a byte selection to `text`, snapping back to char boundaries.
fn clamp(text: &str, selection: std::ops::Range<usize>) -> (usize, usize) {
    let mut start = selection.start.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = selection.end.clamp(start, text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (start, end.max(start))
}
