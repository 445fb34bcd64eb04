use crate::overlay::{OverlayKind, OverlayRegion};
use crate::text::{strip_cr, utf16_len};

/// Panics if `regions` break a scanner invariant for `lines`.
///
/// - ranges are in bounds, ordered and whole-line
/// - no two regions share a line
/// - each region's raw text is exactly the covered source
/// - heading levels are in `1..=6` and match the leading `#` count
pub fn check<S: AsRef<str>>(lines: &[S], regions: &[OverlayRegion]) {
    let mut prev_end: Option<usize> = None;

    for r in regions {
        let range = r.range();
        assert!(
            range.start <= range.end && range.end.line < lines.len(),
            "region range out of bounds: {range:?} (lines: {})",
            lines.len()
        );
        assert_eq!(range.start.character, 0, "region must start a line: {range:?}");
        assert_eq!(
            range.end.character,
            utf16_len(strip_cr(lines[range.end.line].as_ref())),
            "region must end its last line: {range:?}"
        );

        if let Some(prev) = prev_end {
            assert!(
                range.start.line > prev,
                "regions overlap or are out of order at line {}",
                range.start.line
            );
        }
        prev_end = Some(range.end.line);

        let covered: Vec<&str> = lines[range.start.line..=range.end.line]
            .iter()
            .map(|line| line.as_ref())
            .collect();
        let joined = covered.join("\n");
        assert_eq!(
            r.raw_text(),
            joined.strip_suffix('\r').unwrap_or(&joined),
            "raw text differs from source for {range:?}"
        );

        match r.kind() {
            OverlayKind::Heading => {
                let level = r.level().expect("heading without level");
                assert!((1..=6).contains(&level), "heading level out of range: {level}");
                let hashes = r.raw_text().chars().take_while(|c| *c == '#').count();
                assert_eq!(usize::from(level), hashes, "level differs from marker count");
            }
            _ => assert_eq!(r.level(), None, "level on non-heading region"),
        }
    }
}
