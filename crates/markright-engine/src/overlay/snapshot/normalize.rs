use serde::Serialize;

use crate::overlay::{OverlayKind, OverlayRegion};
use crate::text::preview;

#[derive(Debug, Serialize)]
pub struct Snap {
    pub regions: Vec<RegionSnap>,
}

#[derive(Debug, Serialize)]
pub struct RegionSnap {
    pub kind: String,
    pub lines: (usize, usize),
    pub text: String,
    pub rendered: String,
}

/// Converts regions into a stable, human-readable shape for snapshots.
pub fn normalize(regions: &[OverlayRegion]) -> Snap {
    let regions = regions
        .iter()
        .map(|r| {
            let kind = match (r.kind(), r.level()) {
                (OverlayKind::Heading, Some(level)) => format!("Heading({level})"),
                (kind, _) => format!("{kind:?}"),
            };
            RegionSnap {
                kind,
                lines: (r.start_line(), r.end_line()),
                text: preview(r.raw_text(), 80),
                rendered: preview(r.rendered(), 120),
            }
        })
        .collect();

    Snap { regions }
}
