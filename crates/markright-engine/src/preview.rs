//! Full-document HTML preview sent with `update` messages.

use std::fmt;
use std::sync::{Arc, OnceLock};

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

use crate::focus::FocusMode;
use crate::overlay::kinds::DiagramFence;
use crate::overlay::render::{MathRenderer, render_tex};
use crate::wikilink::parse_wiki_links;

/// Renders markdown to the preview pane's HTML.
///
/// `$$..$$` and `$..$` in prose go through the math renderer when one is
/// set, otherwise they show as marked raw spans.
#[derive(Clone, Default)]
pub struct PreviewRenderer {
    focus_mode: FocusMode,
    math: Option<Arc<dyn MathRenderer>>,
}

impl fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("focus_mode", &self.focus_mode)
            .field("math", &self.math.is_some())
            .finish()
    }
}

impl PreviewRenderer {
    pub fn new(focus_mode: FocusMode) -> Self {
        Self {
            focus_mode,
            math: None,
        }
    }

    pub fn with_math(mut self, math: Arc<dyn MathRenderer>) -> Self {
        self.math = Some(math);
        self
    }

    pub fn focus_mode(&self) -> FocusMode {
        self.focus_mode
    }

    pub fn set_focus_mode(&mut self, mode: FocusMode) {
        self.focus_mode = mode;
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));
        let events = self.rewrite_events(parser);

        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut body, events.into_iter());

        format!(
            "<div class=\"markdown-content\" data-focus-mode=\"{}\">{body}</div>",
            self.focus_mode
        )
    }

    /// Replaces code blocks, math and wiki-link text with preview-specific HTML.
    ///
    /// Prose is buffered across soft breaks so a `$$` block written over
    /// several lines of one paragraph is seen whole.
    fn rewrite_events<'a>(&self, events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::new();
        let mut code: Option<(String, String)> = None;
        let mut prose = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    self.push_prose(&mut out, &mut prose);
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .unwrap_or_default()
                            .to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some((language, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, body)) = code.as_mut() {
                        body.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, body)) = code.take() {
                        out.push(Event::Html(code_block(&language, &body).into()));
                    }
                }
                Event::Text(text) => prose.push_str(&text),
                Event::SoftBreak if !prose.is_empty() => prose.push('\n'),
                other => {
                    self.push_prose(&mut out, &mut prose);
                    out.push(other);
                }
            }
        }
        self.push_prose(&mut out, &mut prose);
        out
    }

    fn push_prose<'a>(&self, out: &mut Vec<Event<'a>>, prose: &mut String) {
        if prose.is_empty() {
            return;
        }
        let text = std::mem::take(prose);

        let mut last = 0;
        for caps in math_pattern().captures_iter(&text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let (tex, display) = match (caps.get(1), caps.get(2)) {
                (Some(block), _) => (block.as_str(), true),
                (None, Some(inline)) => (inline.as_str(), false),
                (None, None) => continue,
            };
            if whole.start() > last {
                push_text_with_links(out, text[last..whole.start()].to_string().into());
            }
            let html = render_tex(self.math.as_deref(), tex.trim(), display);
            out.push(Event::InlineHtml(html.into()));
            last = whole.end();
        }
        if last < text.len() {
            push_text_with_links(out, text[last..].to_string().into());
        }
    }
}

/// `$$block$$` is tried before `$inline$` at each position.
fn math_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\$([^$]+)\$\$|\$([^$]+)\$").expect("Invalid math regex")
    })
}

fn code_block(language: &str, body: &str) -> String {
    let body = body.strip_suffix('\n').unwrap_or(body);
    if language == DiagramFence::LANGUAGE {
        return format!(
            "<div class=\"mermaid-container\"><div class=\"mermaid\">{}</div></div>\n",
            encode_text(body)
        );
    }
    let language = if language.is_empty() { "text" } else { language };
    format!(
        "<pre class=\"code-block\"><code class=\"language-{}\">{}</code></pre>\n",
        encode_double_quoted_attribute(language),
        encode_text(body)
    )
}

fn push_text_with_links<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let links = parse_wiki_links(&text);
    if links.is_empty() {
        out.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for link in &links {
        if link.span.start > last {
            out.push(Event::Text(text[last..link.span.start].to_string().into()));
        }
        out.push(Event::InlineHtml(
            format!(
                "<a href=\"#\" class=\"wiki-link\" data-link=\"{}\">{}</a>",
                encode_double_quoted_attribute(link.target),
                encode_text(link.display)
            )
            .into(),
        ));
        last = link.span.end;
    }
    if last < text.len() {
        out.push(Event::Text(text[last..].to_string().into()));
    }
}
