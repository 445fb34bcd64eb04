use xi_rope::Rope;

/// Splits document text into lines the way editor hosts count them.
///
/// Lines are separated by `\n` only; a trailing `\r` stays on its line so
/// that joining the lines with `\n` reproduces the exact source. An empty
/// document and a document ending in a newline both yield a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Returns `line` without a trailing carriage return.
pub fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Collects the rope's lines using [`split_lines`] semantics.
///
/// `lines_raw` keeps newline characters, which are stripped here; an extra
/// empty line is appended when the rope is empty or ends with `\n`.
pub fn rope_lines(rope: &Rope) -> Vec<String> {
    let mut out: Vec<String> = rope
        .lines_raw(..)
        .map(|line| {
            let raw: &str = line.as_ref();
            raw.strip_suffix('\n').unwrap_or(raw).to_string()
        })
        .collect();

    let ends_open = rope.is_empty() || rope.byte_at(rope.len() - 1) == b'\n';
    if ends_open {
        out.push(String::new());
    }
    out
}
