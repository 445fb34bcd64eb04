use serde::Serialize;

use super::viewport::ViewportState;
use crate::overlay::kinds::{Heading, HeadingStyle};
use crate::overlay::{OverlayKind, OverlayRegion};

/// Placement of one overlay element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayDescriptor {
    /// Scan-local index of the region this overlay shows.
    pub index: usize,
    pub kind: OverlayKind,
    pub start_line: usize,
    pub end_line: usize,
    pub top_px: f64,
    pub left_px: f64,
    /// Hidden elements stay in place so scrolling never rebuilds them.
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_style: Option<HeadingStyle>,
}

/// The presenter's answer for one view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub overlays: Vec<OverlayDescriptor>,
    /// Set when the caret sits inside a region and every overlay is hidden.
    pub caret_suppressed: bool,
}

impl Presentation {
    /// Whether any overlay is currently shown over the raw text.
    pub fn any_visible(&self) -> bool {
        self.overlays.iter().any(|o| !o.hidden)
    }
}

/// Decides which overlays are shown and where.
///
/// `caret_line` is `None` while the raw-text editor is blurred, which
/// always leaves overlays visible. When `visibility_enabled` is false the
/// result is empty, but the caller keeps its regions.
pub fn present(
    regions: &[OverlayRegion],
    viewport: &ViewportState,
    caret_line: Option<usize>,
    visibility_enabled: bool,
) -> Presentation {
    if !visibility_enabled {
        return Presentation::default();
    }

    let caret_suppressed = caret_line
        .is_some_and(|line| regions.iter().any(|r| r.range().contains_line(line)));

    let overlays = regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let (start_line, end_line) = (region.start_line(), region.end_line());
            OverlayDescriptor {
                index,
                kind: region.kind(),
                start_line,
                end_line,
                top_px: viewport.line_top(start_line),
                left_px: viewport.left_padding_px,
                hidden: caret_suppressed || viewport.is_outside(start_line, end_line),
                heading_style: region.level().map(Heading::style),
            }
        })
        .collect();

    Presentation {
        overlays,
        caret_suppressed,
    }
}
