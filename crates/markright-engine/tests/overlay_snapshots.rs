use markright_engine::overlay::snapshot;
use markright_engine::text::split_lines;
use markright_engine::{OverlayKind, scan};

fn scan_checked(md: &str) -> Vec<markright_engine::OverlayRegion> {
    let lines = split_lines(md);
    let regions = scan(&lines);
    snapshot::invariants(&lines, &regions);
    regions
}

#[test]
fn headings_snapshot() {
    let regions = scan_checked("# Title\n\nIntro\n\n## Setup: steps\n\n### Café 😀");
    insta::assert_yaml_snapshot!(snapshot::normalize(&regions), @r####"
    regions:
      - kind: Heading(1)
        lines:
          - 0
          - 0
        text: "# Title"
        rendered: Title
      - kind: Heading(2)
        lines:
          - 4
          - 4
        text: "## Setup: steps"
        rendered: "Setup: steps"
      - kind: Heading(3)
        lines:
          - 6
          - 6
        text: "### Café 😀"
        rendered: Café 😀
    "####);
}

#[test]
fn plain_prose_snapshot() {
    let regions = scan_checked("Just a paragraph.\n\nAnd another one.");
    insta::assert_yaml_snapshot!(snapshot::normalize(&regions), @"regions: []");
}

/// Every kind in one document, in source order, without overlap.
#[test]
fn mixed_document_regions() {
    let md = "# Notes\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\n$$\na^2 + b^2\n$$\n\n```mermaid\ngraph TD\nA-->B\n```\n\n## End";
    let regions = scan_checked(md);
    let kinds: Vec<_> = regions.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            OverlayKind::Heading,
            OverlayKind::Table,
            OverlayKind::Latex,
            OverlayKind::Diagram,
            OverlayKind::Heading,
        ]
    );
    let spans: Vec<_> = regions.iter().map(|r| (r.start_line(), r.end_line())).collect();
    assert_eq!(spans, vec![(0, 0), (2, 4), (6, 8), (10, 13), (15, 15)]);
}

/// Carriage returns stay out of raw text and rendered output.
#[test]
fn crlf_document_keeps_ranges_on_lines() {
    let regions = scan_checked("# Title\r\n\r\n| A |\r\n|---|\r\n| 1 |\r\n");
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].raw_text(), "# Title");
    assert_eq!(regions[0].rendered(), "Title");
    assert_eq!((regions[1].start_line(), regions[1].end_line()), (2, 4));
}
