use std::sync::OnceLock;

use regex::Regex;

use crate::text::strip_cr;

/// ATX heading detection and per-level presentation style.
pub struct Heading;

/// A heading line split into its level and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMatch<'a> {
    /// Number of leading `#` characters, 1 through 6.
    pub level: u8,
    /// Heading text with surrounding whitespace trimmed.
    pub text: &'a str,
}

/// Font metrics applied to a heading overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct HeadingStyle {
    pub font_size_px: u16,
    pub font_weight: u16,
}

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: u8 = 6;

    const STYLES: [HeadingStyle; 6] = [
        HeadingStyle { font_size_px: 26, font_weight: 700 },
        HeadingStyle { font_size_px: 22, font_weight: 700 },
        HeadingStyle { font_size_px: 19, font_weight: 700 },
        HeadingStyle { font_size_px: 17, font_weight: 600 },
        HeadingStyle { font_size_px: 15, font_weight: 600 },
        HeadingStyle { font_size_px: 14, font_weight: 600 },
    ];

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("Invalid heading regex"))
    }

    /// Matches `^(#{1,6})\s+(.*)$` against a single line.
    ///
    /// A marker followed only by whitespace is not a heading.
    pub fn detect(line: &str) -> Option<HeadingMatch<'_>> {
        let caps = Self::pattern().captures(strip_cr(line))?;
        let marker = caps.get(1)?;
        let text = caps.get(2)?.as_str().trim();
        if text.is_empty() {
            return None;
        }
        Some(HeadingMatch {
            level: marker.as_str().len() as u8,
            text,
        })
    }

    /// Level of a line that opens a section: a `#` run followed by whitespace.
    ///
    /// Looser than [`Heading::detect`]: a bare `# ` still opens a section.
    pub fn section_level(line: &str) -> Option<u8> {
        let hashes = line.chars().take_while(|c| *c == Self::MARKER).count();
        let rest = &line[hashes..];
        let level = u8::try_from(hashes).ok()?;
        ((1..=Self::MAX_LEVEL).contains(&level) && rest.starts_with(char::is_whitespace))
            .then_some(level)
    }

    /// Style for `level`; out-of-range levels use the level 1 style.
    pub fn style(level: u8) -> HeadingStyle {
        match level {
            1..=6 => Self::STYLES[usize::from(level) - 1],
            _ => Self::STYLES[0],
        }
    }
}
