//! Display fragments for overlay regions.
//!
//! Rendering is a pure function of `(kind, raw text)`. LaTeX and diagram
//! output come from external renderers behind [`MathRenderer`] and
//! [`DiagramRenderer`]; every failure at that boundary is turned into a
//! visible inline fallback here and never propagates further.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::OverlayKind;
use super::kinds::{DiagramFence, Heading, MathBlock, Table};
use crate::text::{split_lines, strip_cr};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("math rendering failed: {0}")]
    Math(String),
    #[error("diagram rendering failed: {0}")]
    Diagram(String),
}

/// How strictly the math renderer treats non-standard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Ignore,
    Warn,
    Error,
}

/// Options passed to the math renderer.
///
/// `max_size` and `max_expand` bound the work a single expression can cause.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MathOptions {
    pub throw_on_error: bool,
    pub strict: Strictness,
    pub display_mode: bool,
    pub max_size: f64,
    pub max_expand: u32,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            throw_on_error: false,
            strict: Strictness::Warn,
            display_mode: false,
            max_size: 50.0,
            max_expand: 100,
        }
    }
}

/// Converts TeX to HTML markup.
pub trait MathRenderer: Send + Sync {
    fn render(&self, tex: &str, options: &MathOptions) -> Result<String, RenderError>;
}

/// Converts diagram source to SVG. Always asynchronous.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    async fn render(&self, code: &str) -> Result<String, RenderError>;
}

/// TeX commands stripped from math input before rendering.
pub const DANGEROUS_TEX_COMMANDS: [&str; 12] = [
    "\\input",
    "\\include",
    "\\write",
    "\\immediate",
    "\\openout",
    "\\closeout",
    "\\catcode",
    "\\def",
    "\\let",
    "\\expandafter",
    "\\csname",
    "\\endcsname",
];

/// Longest math input handed to the renderer, in characters.
pub const MAX_MATH_INPUT: usize = 1000;

/// Removes dangerous commands (case-insensitive) and caps the input length.
pub fn sanitize_tex(tex: &str) -> String {
    let mut sanitized = tex.trim().to_string();
    for cmd in DANGEROUS_TEX_COMMANDS {
        sanitized = remove_ascii_case_insensitive(&sanitized, cmd);
    }
    if sanitized.chars().count() > MAX_MATH_INPUT {
        sanitized = sanitized.chars().take(MAX_MATH_INPUT).collect();
    }
    sanitized
}

fn remove_ascii_case_insensitive(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(needle) {
        out.push_str(&haystack[pos..pos + found]);
        pos += found + needle.len();
    }
    out.push_str(&haystack[pos..]);
    out
}

/// Renders region source into display fragments.
#[derive(Clone, Default)]
pub struct OverlayRenderer {
    math: Option<Arc<dyn MathRenderer>>,
}

impl fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("math", &self.math.is_some())
            .finish()
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_math(math: Arc<dyn MathRenderer>) -> Self {
        Self { math: Some(math) }
    }

    /// Renders `raw` as a region of `kind`.
    ///
    /// Diagram regions render to their bare code; the SVG arrives later
    /// through [`render_diagram`].
    pub fn render(&self, kind: OverlayKind, raw: &str) -> String {
        match kind {
            OverlayKind::Heading => Self::render_heading(raw),
            OverlayKind::Table => Self::render_table(&split_lines(raw)),
            OverlayKind::Latex => self.render_math(&MathBlock::content_of(raw)),
            OverlayKind::Diagram => DiagramFence::code_of(raw),
        }
    }

    /// Heading text with markers stripped; styling is applied by level later.
    pub fn render_heading(raw: &str) -> String {
        let line = split_lines(raw).first().copied().unwrap_or("");
        match Heading::detect(line) {
            Some(m) => m.text.to_string(),
            None => strip_cr(line).trim().to_string(),
        }
    }

    /// Renders table rows to HTML. Fewer than two rows renders nothing.
    pub fn render_table<S: AsRef<str>>(rows: &[S]) -> String {
        if rows.len() < 2 {
            return String::new();
        }

        let header: String = Table::split_row(rows[0].as_ref())
            .into_iter()
            .map(|cell| format!("<th>{}</th>", encode_text(cell)))
            .collect();

        let body: String = rows[2..]
            .iter()
            .map(|row| {
                let cells: String = Table::split_row(row.as_ref())
                    .into_iter()
                    .map(|cell| format!("<td>{}</td>", encode_text(cell)))
                    .collect();
                format!("<tr>{cells}</tr>")
            })
            .collect();

        format!(
            "<table class=\"overlay-table\"><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table>"
        )
    }

    pub fn math(&self) -> Option<Arc<dyn MathRenderer>> {
        self.math.clone()
    }

    /// Renders math content, falling back to a marked raw span.
    pub fn render_math(&self, content: &str) -> String {
        render_tex(self.math.as_deref(), content, content.contains('\n'))
    }
}

/// Sanitizes `content` and renders it with `math`, or returns the
/// `latex-raw` / `latex-error` fallback span.
pub fn render_tex(math: Option<&dyn MathRenderer>, content: &str, display_mode: bool) -> String {
    if content.is_empty() {
        return String::new();
    }

    let Some(math) = math else {
        return math_fallback(content, None);
    };

    let tex = sanitize_tex(content);
    let options = MathOptions {
        display_mode,
        ..MathOptions::default()
    };
    match math.render(&tex, &options) {
        Ok(html) => html,
        Err(e) => {
            log::warn!("{e}");
            math_fallback(content, Some(&e))
        }
    }
}

fn math_fallback(content: &str, error: Option<&RenderError>) -> String {
    match error {
        Some(e) => format!(
            "<span class=\"latex-error\" title=\"{}\">{}</span>",
            encode_double_quoted_attribute(&e.to_string()),
            encode_text(content)
        ),
        None => format!("<span class=\"latex-raw\">{}</span>", encode_text(content)),
    }
}

/// Placeholder shown while a diagram render is in flight.
pub fn diagram_placeholder(code: &str) -> String {
    format!("<div class=\"mermaid\">{}</div>", encode_text(code))
}

/// Preformatted source with an error annotation, shown when a render fails.
pub fn diagram_fallback(code: &str, error: &RenderError) -> String {
    format!(
        "<pre class=\"mermaid diagram-error\" title=\"{}\">{}</pre>",
        encode_double_quoted_attribute(&error.to_string()),
        encode_text(code)
    )
}

/// Renders diagram code to SVG, or to the fallback block on failure.
pub async fn render_diagram(renderer: &dyn DiagramRenderer, code: &str) -> String {
    match renderer.render(code).await {
        Ok(svg) => svg,
        Err(e) => {
            log::warn!("diagram overlay rendering failed: {e}");
            diagram_fallback(code, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct EchoMath;

    impl MathRenderer for EchoMath {
        fn render(&self, tex: &str, options: &MathOptions) -> Result<String, RenderError> {
            Ok(format!(
                "<span class=\"katex\" data-display=\"{}\">{tex}</span>",
                options.display_mode
            ))
        }
    }

    struct FailingMath;

    impl MathRenderer for FailingMath {
        fn render(&self, _tex: &str, _options: &MathOptions) -> Result<String, RenderError> {
            Err(RenderError::Math("Undefined control sequence".into()))
        }
    }

    #[test]
    fn heading_renders_trimmed_text() {
        assert_eq!(OverlayRenderer::render_heading("##   Title  "), "Title");
        assert_eq!(OverlayRenderer::render_heading("  plain "), "plain");
    }

    #[test]
    fn table_renders_header_and_body() {
        let html = OverlayRenderer::render_table(&["| A | B |", "|---|---|", "| 1 | <2> |"]);
        assert_eq!(
            html,
            "<table class=\"overlay-table\"><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>&lt;2&gt;</td></tr></tbody></table>"
        );
    }

    #[test]
    fn table_with_too_few_rows_is_empty() {
        assert_eq!(OverlayRenderer::render_table(&["| A |"]), "");
        assert_eq!(OverlayRenderer::render_table::<&str>(&[]), "");
    }

    #[test]
    fn math_without_backend_falls_back_to_raw_span() {
        let html = OverlayRenderer::new().render(OverlayKind::Latex, "$$\nx<2\n$$");
        assert_eq!(html, "<span class=\"latex-raw\">x&lt;2</span>");
    }

    #[test]
    fn math_with_backend_uses_bounded_options() {
        let renderer = OverlayRenderer::with_math(Arc::new(EchoMath));
        assert_eq!(
            renderer.render(OverlayKind::Latex, "$$ a $$"),
            "<span class=\"katex\" data-display=\"false\">a</span>"
        );
        let defaults = MathOptions::default();
        assert!(!defaults.throw_on_error);
        assert_eq!(defaults.strict, Strictness::Warn);
        assert_eq!(defaults.max_size, 50.0);
        assert_eq!(defaults.max_expand, 100);
    }

    #[test]
    fn math_failure_is_recovered_locally() {
        let renderer = OverlayRenderer::with_math(Arc::new(FailingMath));
        let html = renderer.render(OverlayKind::Latex, "$$ \\bad $$");
        assert!(html.starts_with("<span class=\"latex-error\""));
        assert!(html.contains("\\bad"));
        assert!(html.contains("Undefined control sequence"));
    }

    #[test]
    fn empty_math_renders_nothing() {
        assert_eq!(OverlayRenderer::new().render(OverlayKind::Latex, "$$$$"), "");
    }

    #[test]
    fn sanitize_strips_dangerous_commands() {
        assert_eq!(sanitize_tex(" \\INPUT{x} a \\def\\b "), "{x} a \\b");
        let long = "x".repeat(MAX_MATH_INPUT + 10);
        assert_eq!(sanitize_tex(&long).len(), MAX_MATH_INPUT);
    }

    #[test]
    fn diagram_renders_code_until_resolved() {
        let rendered =
            OverlayRenderer::new().render(OverlayKind::Diagram, "```mermaid\ngraph TD\nA-->B\n```");
        assert_eq!(rendered, "graph TD\nA-->B");
    }

    #[test]
    fn diagram_fallback_escapes_source() {
        let html = diagram_fallback("A-->B", &RenderError::Diagram("parse error".into()));
        assert_eq!(
            html,
            "<pre class=\"mermaid diagram-error\" title=\"diagram rendering failed: parse error\">A--&gt;B</pre>"
        );
    }
}
