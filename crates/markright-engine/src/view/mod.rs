//! # Rendered View
//!
//! Per-view state for a webview-style surface that shows a raw-text editor
//! with rendered overlays on top, and an optional preview pane.
//!
//! - **`viewport`**: visible line window and layout metrics
//! - **`presenter`**: which overlays show and where
//! - **`session`**: the region edit state machine
//!
//! [`ViewState`] owns all of it for one view. It consumes [`HostMessage`]s
//! and editor events, and queues [`ViewMessage`]s for the host. Nothing in
//! here is shared between views.
//!
//! ## Async Diagram Renders
//!
//! Diagram slots start as placeholders. Each is handed out once as a
//! [`DiagramJob`] tagged with the scan generation; its result is applied
//! only if that generation is still current and the slot still holds the
//! same diagram source.

pub mod presenter;
pub mod session;
pub mod viewport;

use std::ops::Range;

pub use presenter::{OverlayDescriptor, Presentation, present};
pub use session::{
    EditSession, EditorKey, KeyPress, RegionEditor, SessionExit, SessionState, splice_lines,
};
pub use viewport::{DEFAULT_LINE_HEIGHT_PX, LayoutMetrics, ViewportState, ViewportTracker};

use crate::focus::{FocusMode, FocusView, focus_view};
use crate::overlay::kinds::DiagramFence;
use crate::overlay::render::{DiagramRenderer, OverlayRenderer, diagram_placeholder, render_diagram};
use crate::overlay::{OverlayKind, OverlayRegion};
use crate::preview::PreviewRenderer;
use crate::protocol::{HostMessage, ViewId, ViewMessage, VisibleRange};
use crate::snippets::{self, Insertion, Snippet};
use crate::text::{SourcePosition, byte_offset, position_at, split_lines};

/// Display content of one overlay slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Ready(String),
    /// Placeholder shown until the diagram render resolves.
    Pending(String),
}

impl Fragment {
    pub fn html(&self) -> &str {
        match self {
            Self::Ready(html) | Self::Pending(html) => html,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// What a slot shows right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotView<'a> {
    /// The region is being edited; the control holds this value.
    Control(&'a str),
    Fragment(&'a Fragment),
}

/// Where a click on a rendered region landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget<'a> {
    /// A wiki-link anchor; navigates instead of editing.
    WikiLink(&'a str),
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramTicket {
    pub generation: u64,
    pub index: usize,
}

/// A diagram render waiting to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramJob {
    pub ticket: DiagramTicket,
    pub code: String,
}

impl DiagramJob {
    /// Renders the diagram; failures come back as the fallback block.
    pub async fn run(self, renderer: &dyn DiagramRenderer) -> DiagramOutput {
        let html = render_diagram(renderer, &self.code).await;
        DiagramOutput {
            ticket: self.ticket,
            code: self.code,
            html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOutput {
    pub ticket: DiagramTicket,
    pub code: String,
    pub html: String,
}

/// Startup settings for a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Selective editing. Off means no overlays and no region sessions.
    pub overlays_enabled: bool,
    pub default_line_height_px: f64,
    pub focus_mode: FocusMode,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            overlays_enabled: true,
            default_line_height_px: DEFAULT_LINE_HEIGHT_PX,
            focus_mode: FocusMode::Off,
        }
    }
}

/// Everything one view knows. The document text here is a replica; the
/// host's buffer is authoritative.
#[derive(Debug)]
pub struct ViewState {
    id: ViewId,
    text: String,
    preview_html: Option<String>,
    preview_visible: bool,
    regions: Vec<OverlayRegion>,
    fragments: Vec<Fragment>,
    generation: u64,
    diagram_jobs: Vec<DiagramJob>,
    viewport: ViewportTracker,
    host_visible_range: Option<VisibleRange>,
    selection: (SourcePosition, SourcePosition),
    focused: bool,
    overlays_enabled: bool,
    overlays_visible: bool,
    focus_mode: FocusMode,
    editor: RegionEditor,
    renderer: OverlayRenderer,
    outbox: Vec<ViewMessage>,
}

impl ViewState {
    pub fn new(options: ViewOptions, renderer: OverlayRenderer) -> Self {
        Self {
            id: ViewId::new(),
            text: String::new(),
            preview_html: None,
            preview_visible: false,
            regions: Vec::new(),
            fragments: Vec::new(),
            generation: 0,
            diagram_jobs: Vec::new(),
            viewport: ViewportTracker::with_default_line_height(options.default_line_height_px),
            host_visible_range: None,
            selection: (SourcePosition::default(), SourcePosition::default()),
            focused: false,
            overlays_enabled: options.overlays_enabled,
            overlays_visible: true,
            focus_mode: options.focus_mode,
            editor: RegionEditor::new(),
            renderer,
            outbox: Vec::new(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn preview_html(&self) -> Option<&str> {
        self.preview_html.as_deref()
    }

    pub fn is_preview_visible(&self) -> bool {
        self.preview_visible
    }

    pub fn regions(&self) -> &[OverlayRegion] {
        &self.regions
    }

    pub fn fragment(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> &ViewportTracker {
        &self.viewport
    }

    pub fn host_visible_range(&self) -> Option<VisibleRange> {
        self.host_visible_range
    }

    pub fn caret(&self) -> SourcePosition {
        self.selection.1
    }

    pub fn overlays_visible(&self) -> bool {
        self.overlays_enabled && self.overlays_visible
    }

    pub fn overlays_enabled(&self) -> bool {
        self.overlays_enabled
    }

    /// Turns selective editing on or off. Turning it off cancels any
    /// active region session.
    pub fn set_overlays_enabled(&mut self, enabled: bool) {
        self.overlays_enabled = enabled;
        if !enabled && self.editor.cancel().is_some() {
            log::debug!("view {}: region session dropped with overlays", self.id);
        }
    }

    pub fn focus_mode(&self) -> FocusMode {
        self.focus_mode
    }

    pub fn editor(&self) -> &RegionEditor {
        &self.editor
    }

    /// Applies one message from the host.
    pub fn handle(&mut self, message: HostMessage) {
        log::debug!("view {} <- {}", self.id, message.kind());
        match message {
            HostMessage::Update { text, html } => {
                self.preview_html = Some(match html {
                    Some(html) => html,
                    None => self.preview_renderer().render(&text),
                });
                self.text = text;
            }
            HostMessage::TogglePreview => self.toggle_preview(),
            HostMessage::UpdateOverlays { overlays } => self.replace_overlays(overlays),
            HostMessage::PositionUpdate { visible_range } => {
                self.host_visible_range = Some(visible_range);
            }
            HostMessage::SetVisibility { visible } => self.overlays_visible = visible,
        }
    }

    pub fn toggle_preview(&mut self) {
        self.preview_visible = !self.preview_visible;
        if self.preview_visible && self.preview_html.is_none() {
            self.preview_html = Some(self.preview_renderer().render(&self.text));
        }
    }

    fn preview_renderer(&self) -> PreviewRenderer {
        let preview = PreviewRenderer::new(self.focus_mode);
        match self.renderer.math() {
            Some(math) => preview.with_math(math),
            None => preview,
        }
    }

    /// Replaces every slot with a fresh scan and bumps the generation, which
    /// makes every outstanding diagram ticket stale.
    fn replace_overlays(&mut self, overlays: Vec<OverlayRegion>) {
        self.generation += 1;
        self.diagram_jobs.clear();
        self.fragments = overlays
            .iter()
            .enumerate()
            .map(|(index, region)| self.fragment_for(index, region))
            .collect();
        self.regions = overlays;
    }

    fn fragment_for(&mut self, index: usize, region: &OverlayRegion) -> Fragment {
        if region.kind() != OverlayKind::Diagram {
            return Fragment::Ready(region.rendered().to_string());
        }
        let code = DiagramFence::code_of(region.raw_text());
        self.diagram_jobs.push(DiagramJob {
            ticket: DiagramTicket {
                generation: self.generation,
                index,
            },
            code: code.clone(),
        });
        Fragment::Pending(diagram_placeholder(&code))
    }

    /// Diagram renders queued since the last call.
    pub fn take_diagram_jobs(&mut self) -> Vec<DiagramJob> {
        std::mem::take(&mut self.diagram_jobs)
    }

    /// Applies a finished diagram render unless a newer scan replaced it.
    ///
    /// Returns whether the fragment was applied; positions should be
    /// recomputed when it was, since the element's size changed.
    pub fn apply_diagram(&mut self, output: DiagramOutput) -> bool {
        let DiagramTicket { generation, index } = output.ticket;
        let current = generation == self.generation
            && self.regions.get(index).is_some_and(|region| {
                region.kind() == OverlayKind::Diagram
                    && DiagramFence::code_of(region.raw_text()) == output.code
            });
        if !current {
            log::debug!("dropping stale diagram render (generation {generation}, slot {index})");
            return false;
        }
        self.fragments[index] = Fragment::Ready(output.html);
        true
    }

    /// Renders every queued diagram and applies the results.
    pub async fn resolve_diagrams(&mut self, renderer: &dyn DiagramRenderer) -> usize {
        let mut applied = 0;
        for job in self.take_diagram_jobs() {
            let output = job.run(renderer).await;
            if self.apply_diagram(output) {
                applied += 1;
            }
        }
        applied
    }

    // Raw-text editor events.

    /// The user typed in the raw-text editor.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if self.preview_visible {
            self.preview_html = Some(self.preview_renderer().render(&self.text));
        }
        self.outbox.push(ViewMessage::Edit {
            text: self.text.clone(),
            range: None,
        });
    }

    pub fn move_caret(&mut self, caret: SourcePosition) {
        self.selection = (caret, caret);
    }

    pub fn select(&mut self, anchor: SourcePosition, head: SourcePosition) {
        self.selection = (anchor, head);
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Blurring the raw-text editor always brings overlays back.
    pub fn blur(&mut self) {
        self.focused = false;
        self.overlays_visible = true;
    }

    pub fn scroll(&mut self, scroll_top: f64, client_height: f64) {
        self.viewport.scroll(scroll_top, client_height);
    }

    pub fn measure(&mut self, metrics: LayoutMetrics) {
        self.viewport.measure(metrics);
    }

    /// Current overlay placement; empty until the viewport is known.
    pub fn presentation(&self) -> Presentation {
        let Some(viewport) = self.viewport.state() else {
            log::debug!("view {} has no layout yet", self.id);
            return Presentation::default();
        };
        let caret_line = self.focused.then_some(self.caret().line);
        present(&self.regions, &viewport, caret_line, self.overlays_visible())
    }

    /// Dimmed spans for the current focus mode and caret.
    pub fn focus_view(&self) -> Option<FocusView> {
        focus_view(self.focus_mode, &split_lines(&self.text), self.caret().line)
    }

    pub fn toggle_focus_mode(&mut self) {
        self.focus_mode = self.focus_mode.next();
        if self.preview_visible {
            self.preview_html = Some(self.preview_renderer().render(&self.text));
        }
        self.outbox.push(ViewMessage::FocusModeChange {
            mode: self.focus_mode,
        });
    }

    // Rendered region events.

    /// A click on slot `index`. Links navigate; anything else starts editing.
    pub fn click_region(&mut self, index: usize, target: ClickTarget<'_>) {
        match target {
            ClickTarget::WikiLink(link) => self.open_link(link),
            ClickTarget::Content if !self.overlays_enabled => {
                log::debug!("overlays disabled, ignoring click on slot {index}");
            }
            ClickTarget::Content => {
                let Some(region) = self.regions.get(index).cloned() else {
                    log::debug!("click on missing slot {index}");
                    return;
                };
                let exit = self.editor.activate(region, &self.text, &self.renderer);
                self.finish(exit);
            }
        }
    }

    pub fn region_input(&mut self, value: impl Into<String>) {
        self.editor.input(value);
    }

    pub fn region_key(&mut self, press: KeyPress) {
        let exit = self.editor.key(press, &self.text, &self.renderer);
        self.finish(exit);
    }

    pub fn region_blur(&mut self) {
        let exit = self.editor.blur(&self.text, &self.renderer);
        self.finish(exit);
    }

    /// The control value while slot `index` is edited, otherwise its fragment.
    pub fn slot_view(&self, index: usize) -> Option<SlotView<'_>> {
        let region = self.regions.get(index)?;
        if let Some(session) = self.editor.session()
            && session.target().same_place(region)
        {
            return Some(SlotView::Control(session.value()));
        }
        self.fragments.get(index).map(SlotView::Fragment)
    }

    fn finish(&mut self, exit: Option<SessionExit>) {
        let Some(SessionExit::Committed { region, document }) = exit else {
            return;
        };
        let Some(document) = document else {
            return;
        };

        if let Some(index) = self
            .regions
            .iter()
            .position(|r| r.start_line() == region.start_line() && r.kind() == region.kind())
        {
            self.fragments[index] = self.fragment_for(index, &region);
            self.regions[index] = region;
        }
        self.text = document;
        self.outbox.push(ViewMessage::Edit {
            text: self.text.clone(),
            range: None,
        });
    }

    // Requests to the host.

    pub fn open_link(&mut self, link: &str) {
        self.outbox.push(ViewMessage::OpenWikiLink {
            link: link.to_string(),
        });
    }

    pub fn insert_wiki_link_at(&mut self, position: SourcePosition, target: &str) {
        self.outbox.push(ViewMessage::InsertWikiLink {
            position,
            text: target.to_string(),
        });
    }

    pub fn reveal_in_host(&mut self, position: SourcePosition) {
        self.outbox.push(ViewMessage::Cursor {
            line: position.line,
            character: position.character,
        });
    }

    pub fn request_content(&mut self) {
        self.outbox.push(ViewMessage::RequestContent);
    }

    // Toolbar actions.

    pub fn insert_snippet(&mut self, snippet: Snippet) {
        let insertion = snippets::insert_snippet(&self.text, self.selected_bytes(), snippet);
        self.apply_insertion(insertion);
    }

    pub fn insert_math(&mut self) {
        let insertion = snippets::insert_math(&self.text, self.selected_bytes());
        self.apply_insertion(insertion);
    }

    pub fn wrap_in_wiki_link(&mut self) {
        let insertion = snippets::insert_wiki_link(&self.text, self.selected_bytes());
        self.apply_insertion(insertion);
    }

    pub fn insert_bold(&mut self) {
        let insertion = snippets::insert_bold(&self.text, self.selected_bytes());
        self.apply_insertion(insertion);
    }

    pub fn insert_italic(&mut self) {
        let insertion = snippets::insert_italic(&self.text, self.selected_bytes());
        self.apply_insertion(insertion);
    }

    pub fn indent(&mut self) {
        let insertion = snippets::indent(&self.text, self.selected_bytes());
        self.apply_insertion(insertion);
    }

    pub fn unindent(&mut self) {
        let insertion = snippets::unindent(&self.text, self.selected_bytes());
        if insertion.text != self.text {
            self.apply_insertion(insertion);
        }
    }

    /// Raw-text editor shortcuts. Returns whether the key was consumed.
    ///
    /// Ctrl/Cmd+B bolds, Ctrl/Cmd+I italicizes, Ctrl/Cmd+K makes a wiki-link,
    /// Tab indents and Shift+Tab unindents.
    pub fn editor_key(&mut self, press: KeyPress) -> bool {
        match press.key {
            EditorKey::Char(c) if press.command() => match c.to_ascii_lowercase() {
                'b' => self.insert_bold(),
                'i' => self.insert_italic(),
                'k' => self.wrap_in_wiki_link(),
                _ => return false,
            },
            EditorKey::Tab if press.shift => self.unindent(),
            EditorKey::Tab => self.indent(),
            _ => return false,
        }
        true
    }

    fn selected_bytes(&self) -> Range<usize> {
        let a = byte_offset(&self.text, self.selection.0);
        let b = byte_offset(&self.text, self.selection.1);
        a.min(b)..a.max(b)
    }

    fn apply_insertion(&mut self, insertion: Insertion) {
        let Insertion { text, selection } = insertion;
        self.selection = (
            position_at(&text, selection.start),
            position_at(&text, selection.end),
        );
        self.input(text);
    }

    /// Messages queued for the host since the last call.
    pub fn take_outbox(&mut self) -> Vec<ViewMessage> {
        std::mem::take(&mut self.outbox)
    }
}
