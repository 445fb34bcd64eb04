//! # Overlay Regions
//!
//! Typed regions of a markdown document (headings, tables, math blocks,
//! diagrams) that the view shows as rendered overlays in place of raw syntax.
//!
//! ## Pipeline
//!
//! 1. **Scanning** (`scan`): a single forward pass over the document lines
//!    emits non-overlapping [`OverlayRegion`]s in source order
//! 2. **Rendering** (`render`): each region's display fragment is derived
//!    from its raw text; math and diagrams go through external renderers
//! 3. **Registry** (`registry`): the latest region list per document,
//!    replaced wholesale on every scan
//!
//! ## Key Invariants
//!
//! - Regions have no identity across scans; consumers re-resolve by
//!   `(kind, range)` or by scan-local index
//! - `rendered` is never edited directly; a new raw text means a new region
//! - `raw_text` equals the document text covered by `range`

pub mod kinds;
pub mod registry;
pub mod render;
pub mod scan;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use crate::text::{SourceRange, split_lines, utf16_len};
use kinds::Heading;
use render::OverlayRenderer;

pub use registry::{DocumentId, OverlayRegistry};
pub use render::{DiagramRenderer, MathOptions, MathRenderer, RenderError};
pub use scan::{RegionScanner, scan};

/// The closed set of overlay region kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Heading,
    Table,
    Latex,
    Diagram,
}

/// A contiguous source span rendered as an overlay.
///
/// Serializes to the wire shape
/// `{type, level?, range, content, rendered}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRegion {
    #[serde(rename = "type")]
    kind: OverlayKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<u8>,
    range: SourceRange,
    #[serde(rename = "content")]
    raw_text: String,
    rendered: String,
}

impl OverlayRegion {
    /// Builds a region whose level and fragment are derived from `raw_text`.
    pub fn new(
        kind: OverlayKind,
        range: SourceRange,
        raw_text: impl Into<String>,
        renderer: &OverlayRenderer,
    ) -> Self {
        let raw_text = raw_text.into();
        let level = match kind {
            OverlayKind::Heading => split_lines(&raw_text)
                .first()
                .and_then(|line| Heading::detect(line))
                .map(|m| m.level),
            _ => None,
        };
        let rendered = renderer.render(kind, &raw_text);
        Self {
            kind,
            level,
            range,
            raw_text,
            rendered,
        }
    }

    /// The region that results from replacing this region's source.
    ///
    /// The new range starts where this one did and covers the new text.
    pub fn with_text(&self, raw_text: &str, renderer: &OverlayRenderer) -> Self {
        let lines = split_lines(raw_text);
        let last = lines.last().copied().unwrap_or("");
        let range = SourceRange::lines(
            self.range.start.line,
            self.range.start.line + lines.len() - 1,
            utf16_len(last),
        );
        Self::new(self.kind, range, raw_text, renderer)
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Heading level, present only for heading regions.
    pub fn level(&self) -> Option<u8> {
        self.level
    }

    pub fn range(&self) -> SourceRange {
        self.range
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn start_line(&self) -> usize {
        self.range.start.line
    }

    pub fn end_line(&self) -> usize {
        self.range.end.line
    }

    /// Whether this region is the same `(kind, range)` as `other`.
    pub fn same_place(&self, other: &OverlayRegion) -> bool {
        self.kind == other.kind && self.range == other.range
    }
}
