use std::sync::OnceLock;

use regex::Regex;

/// GFM pipe table detection.
pub struct Table;

impl Table {
    pub const PIPE: char = '|';

    fn separator_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"^\s*\|?(\s*:?-+:?\s*\|)+\s*$").expect("Invalid table separator regex")
        })
    }

    /// A line belongs to a table when it contains a pipe.
    pub fn is_row(line: &str) -> bool {
        line.contains(Self::PIPE)
    }

    /// Whether `line` is a header separator such as `|---|:--:|`.
    pub fn is_separator(line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.contains('-') && Self::separator_pattern().is_match(trimmed)
    }

    /// Detects a table starting at `start`, returning its last line index.
    ///
    /// Needs a header row followed directly by a separator; body rows are
    /// taken while lines keep containing a pipe.
    pub fn detect<S: AsRef<str>>(lines: &[S], start: usize) -> Option<usize> {
        let header = lines.get(start)?.as_ref();
        let separator = lines.get(start + 1)?.as_ref();
        if !Self::is_row(header) || !Self::is_separator(separator) {
            return None;
        }

        let mut end = start + 1;
        for (idx, line) in lines.iter().enumerate().skip(start + 2) {
            if !Self::is_row(line.as_ref()) {
                break;
            }
            end = idx;
        }
        Some(end)
    }

    /// Splits a row into trimmed cells, dropping one outer pipe on each side.
    pub fn split_row(row: &str) -> Vec<&str> {
        let trimmed = row.trim();
        let inner = trimmed.strip_prefix(Self::PIPE).unwrap_or(trimmed);
        let inner = inner.strip_suffix(Self::PIPE).unwrap_or(inner);
        inner.split(Self::PIPE).map(str::trim).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("|---|---|")]
    #[case("| :-- | --: |")]
    #[case("---|---|")]
    #[case("  |:-:|  ")]
    fn accepts_separators(#[case] line: &str) {
        assert!(Table::is_separator(line));
    }

    #[rstest]
    #[case("| a | b |")]
    #[case("---")]
    #[case("|---|---")]
    #[case("")]
    fn rejects_separators(#[case] line: &str) {
        assert!(!Table::is_separator(line));
    }

    #[test]
    fn detect_extends_over_pipe_rows() {
        let lines = ["| A | B |", "|---|---|", "| 1 | 2 |", "| 3 | 4 |", "after"];
        assert_eq!(Table::detect(&lines, 0), Some(3));
    }

    #[test]
    fn header_and_separator_alone_is_a_table() {
        let lines = ["| A | B |", "|---|---|"];
        assert_eq!(Table::detect(&lines, 0), Some(1));
    }

    #[test]
    fn header_without_separator_is_not_a_table() {
        let lines = ["|a|b|", "text"];
        assert_eq!(Table::detect(&lines, 0), None);
        assert_eq!(Table::detect(&["|a|b|"], 0), None);
    }

    #[test]
    fn split_row_trims_cells() {
        assert_eq!(Table::split_row("| A |  B |"), vec!["A", "B"]);
        assert_eq!(Table::split_row("x|y"), vec!["x", "y"]);
        assert_eq!(Table::split_row("| a || c |"), vec!["a", "", "c"]);
    }
}
