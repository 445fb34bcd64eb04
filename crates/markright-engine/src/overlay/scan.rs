use crate::text::{SourceRange, strip_cr, utf16_len};

use super::{
    OverlayKind, OverlayRegion,
    kinds::{DiagramFence, Heading, MathBlock, Table},
    render::OverlayRenderer,
};

/// Scans document lines into overlay regions using the default renderer.
pub fn scan<S: AsRef<str>>(lines: &[S]) -> Vec<OverlayRegion> {
    RegionScanner::new(&OverlayRenderer::default()).scan(lines)
}

/// Line-oriented single-pass region scanner.
///
/// At every line not consumed by an earlier match the detectors run in a
/// fixed order (table, math, diagram, heading). The first match consumes its
/// lines and scanning resumes after its last line. Unclosed math blocks and
/// diagram fences match nothing and leave their lines as plain text.
pub struct RegionScanner<'r> {
    renderer: &'r OverlayRenderer,
}

impl<'r> RegionScanner<'r> {
    pub fn new(renderer: &'r OverlayRenderer) -> Self {
        Self { renderer }
    }

    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> Vec<OverlayRegion> {
        let mut out = Vec::new();
        let mut line = 0;

        while line < lines.len() {
            match Self::detect(lines, line) {
                Some((kind, end)) => {
                    out.push(self.region(lines, kind, line, end));
                    line = end + 1;
                }
                None => line += 1,
            }
        }

        log::debug!("scanned {} lines into {} regions", lines.len(), out.len());
        out
    }

    /// Runs the detectors at `line` in precedence order.
    fn detect<S: AsRef<str>>(lines: &[S], line: usize) -> Option<(OverlayKind, usize)> {
        if let Some(end) = Table::detect(lines, line) {
            return Some((OverlayKind::Table, end));
        }
        if let Some(m) = MathBlock::detect(lines, line) {
            return Some((OverlayKind::Latex, m.end_line));
        }
        if let Some(m) = DiagramFence::detect(lines, line) {
            return Some((OverlayKind::Diagram, m.end_line));
        }
        if Heading::detect(lines[line].as_ref()).is_some() {
            return Some((OverlayKind::Heading, line));
        }
        None
    }

    fn region<S: AsRef<str>>(
        &self,
        lines: &[S],
        kind: OverlayKind,
        start: usize,
        end: usize,
    ) -> OverlayRegion {
        let covered: Vec<&str> = lines[start..=end].iter().map(|line| line.as_ref()).collect();
        let mut raw = covered.join("\n");
        if raw.ends_with('\r') {
            raw.pop();
        }
        let end_len = utf16_len(strip_cr(covered[covered.len() - 1]));
        OverlayRegion::new(
            kind,
            SourceRange::lines(start, end, end_len),
            raw,
            self.renderer,
        )
    }
}
