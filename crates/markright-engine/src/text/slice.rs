use std::ops::Range;

use xi_rope::Rope;

/// Extracts the text for a byte range from the rope as an owned String.
///
/// This allocates; prefer working with ranges where possible.
pub fn slice_to_string(rope: &Rope, range: Range<usize>) -> String {
    rope.slice_to_cow(range).into_owned()
}

/// Truncates `s` to at most `max` bytes with a "..." suffix if needed.
///
/// Used for log lines and snapshot output. Truncation backs off to the
/// nearest char boundary.
pub fn preview(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = s[..cut].to_string();
    out.push_str("...");
    out
}
