//! # Document Host
//!
//! The single owner of every open document buffer. Views never share state
//! with the host; they exchange [`ViewMessage`]s and [`HostMessage`]s over
//! channels, and every mutation is serialized through [`DocumentHost::handle`].
//!
//! ## Change Pipeline
//!
//! 1. An edit (from a view or from outside) is applied to the [`Document`]
//! 2. The document is rescanned and the [`OverlayRegistry`] entry replaced
//! 3. Every attached view gets `updateOverlays`, `positionUpdate` and
//!    `setVisibility(true)` right away
//! 4. A per-view [`Debouncer`] is restarted; when it fires the view gets one
//!    `update` with the then-current text and preview HTML
//!
//! `requestContent` bypasses the debounce and answers at once.

pub mod debounce;
pub mod document;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use document::{Document, Edit};

use crate::focus::FocusMode;
use crate::overlay::render::OverlayRenderer;
use crate::overlay::{DocumentId, OverlayRegion, OverlayRegistry, RegionScanner};
use crate::preview::PreviewRenderer;
use crate::protocol::{HostMessage, ViewId, ViewMessage, VisibleRange};
use crate::text::{SourcePosition, SourceRange};
use crate::wikilink::{ResolvedLink, WikiLink, WikiLinkError, WikiLinkResolver};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("unknown document: {0}")]
    UnknownDocument(DocumentId),
    #[error("unknown view: {0}")]
    UnknownView(ViewId),
    #[error("document already open: {0}")]
    AlreadyOpen(DocumentId),
    #[error("position {position:?} is past the last line ({lines} lines)")]
    PositionOutOfRange {
        position: SourcePosition,
        lines: usize,
    },
    #[error("range ends before it starts: {range:?}")]
    InvalidRange { range: SourceRange },
    #[error(transparent)]
    WikiLink(#[from] WikiLinkError),
}

/// Input to the host task.
#[derive(Debug)]
pub enum HostEvent {
    Open {
        document: DocumentId,
        text: String,
    },
    Close {
        document: DocumentId,
    },
    Attach {
        view: ViewId,
        document: DocumentId,
        outbox: UnboundedSender<HostMessage>,
    },
    Detach {
        view: ViewId,
    },
    FromView {
        view: ViewId,
        message: ViewMessage,
    },
    /// An edit that did not come from a view, e.g. the host's own editor.
    ExternalEdit {
        document: DocumentId,
        edit: Edit,
    },
    /// The host editor's caret moved.
    SelectionChanged {
        document: DocumentId,
        position: SourcePosition,
    },
    /// The host editor scrolled.
    VisibleRangeChanged {
        document: DocumentId,
        range: VisibleRange,
    },
    TogglePreview,
    FocusModeChanged {
        mode: FocusMode,
    },
}

/// Things the embedding application should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotice {
    /// Carries the full text so the embedder can persist it.
    DocumentChanged {
        document: DocumentId,
        version: u64,
        text: String,
    },
    OpenFile { path: PathBuf, created: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostOptions {
    pub debounce: Duration,
    pub focus_mode: FocusMode,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            focus_mode: FocusMode::Off,
        }
    }
}

#[derive(Debug)]
struct OpenDocument {
    document: Document,
    visible_range: Option<VisibleRange>,
}

impl OpenDocument {
    /// The host editor's visible lines, or the whole document.
    fn visible_range(&self) -> VisibleRange {
        self.visible_range.unwrap_or(VisibleRange {
            start: 0,
            end: self.document.line_count() - 1,
        })
    }
}

#[derive(Debug)]
struct ViewLink {
    document: DocumentId,
    outbox: UnboundedSender<HostMessage>,
    debounce: Debouncer,
}

impl ViewLink {
    /// Fire and forget; a closed view is cleaned up on `Detach`.
    fn send(&self, message: HostMessage) {
        let kind = message.kind();
        if self.outbox.send(message).is_err() {
            log::debug!("dropping {kind} for a closed view on {}", self.document);
        }
    }
}

/// Owner of all open documents and the views attached to them.
#[derive(Debug)]
pub struct DocumentHost {
    documents: BTreeMap<DocumentId, OpenDocument>,
    views: BTreeMap<ViewId, ViewLink>,
    registry: OverlayRegistry,
    renderer: OverlayRenderer,
    preview: PreviewRenderer,
    resolver: Option<WikiLinkResolver>,
    notices: Option<UnboundedSender<HostNotice>>,
    debounce: Duration,
}

impl Default for DocumentHost {
    fn default() -> Self {
        Self::new(HostOptions::default())
    }
}

impl DocumentHost {
    pub fn new(options: HostOptions) -> Self {
        Self {
            documents: BTreeMap::new(),
            views: BTreeMap::new(),
            registry: OverlayRegistry::new(),
            renderer: OverlayRenderer::new(),
            preview: PreviewRenderer::new(options.focus_mode),
            resolver: None,
            notices: None,
            debounce: options.debounce,
        }
    }

    /// Overlay renderer; its math backend also renders preview math.
    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        if let Some(math) = renderer.math() {
            self.preview = PreviewRenderer::new(self.preview.focus_mode()).with_math(math);
        }
        self.renderer = renderer;
        self
    }

    pub fn with_resolver(mut self, resolver: WikiLinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_notices(mut self, notices: UnboundedSender<HostNotice>) -> Self {
        self.notices = Some(notices);
        self
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id).map(|open| &open.document)
    }

    pub fn focus_mode(&self) -> FocusMode {
        self.preview.focus_mode()
    }

    /// Earliest pending debounce deadline across all views.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.views
            .values()
            .filter_map(|link| link.debounce.deadline())
            .min()
    }

    /// Applies one event. Errors are local to the event; the host stays usable.
    pub fn handle(&mut self, event: HostEvent, now: Instant) -> Result<(), HostError> {
        match event {
            HostEvent::Open { document, text } => self.open(document, &text),
            HostEvent::Close { document } => self.close(&document),
            HostEvent::Attach {
                view,
                document,
                outbox,
            } => self.attach(view, document, outbox),
            HostEvent::Detach { view } => match self.views.remove(&view) {
                Some(link) => {
                    log::debug!("view {view} detached from {}", link.document);
                    Ok(())
                }
                None => Err(HostError::UnknownView(view)),
            },
            HostEvent::FromView { view, message } => self.view_message(view, message, now),
            HostEvent::ExternalEdit { document, edit } => self.edit(&document, edit, now),
            HostEvent::SelectionChanged { document, position } => {
                self.selection_changed(&document, position)
            }
            HostEvent::VisibleRangeChanged { document, range } => {
                let open = self
                    .documents
                    .get_mut(&document)
                    .ok_or_else(|| HostError::UnknownDocument(document.clone()))?;
                open.visible_range = Some(range);
                self.broadcast(&document, |_| HostMessage::PositionUpdate {
                    visible_range: range,
                });
                Ok(())
            }
            HostEvent::TogglePreview => {
                if self.views.is_empty() {
                    log::info!("no open views to toggle preview in");
                }
                for link in self.views.values() {
                    link.send(HostMessage::TogglePreview);
                }
                Ok(())
            }
            HostEvent::FocusModeChanged { mode } => {
                self.set_focus_mode(mode, now);
                Ok(())
            }
        }
    }

    fn open(&mut self, id: DocumentId, text: &str) -> Result<(), HostError> {
        if self.documents.contains_key(&id) {
            return Err(HostError::AlreadyOpen(id));
        }
        let open = OpenDocument {
            document: Document::new(text),
            visible_range: None,
        };
        let regions = self.scan(&open.document);
        log::debug!("opened {id} with {} overlay regions", regions.len());
        self.registry.update(id.clone(), regions);
        self.documents.insert(id, open);
        Ok(())
    }

    fn close(&mut self, id: &DocumentId) -> Result<(), HostError> {
        self.documents
            .remove(id)
            .ok_or_else(|| HostError::UnknownDocument(id.clone()))?;
        self.registry.remove(id);
        self.views.retain(|_, link| &link.document != id);
        log::debug!("closed {id}");
        Ok(())
    }

    fn attach(
        &mut self,
        view: ViewId,
        document: DocumentId,
        outbox: UnboundedSender<HostMessage>,
    ) -> Result<(), HostError> {
        let open = self
            .documents
            .get(&document)
            .ok_or_else(|| HostError::UnknownDocument(document.clone()))?;

        let link = ViewLink {
            document: document.clone(),
            outbox,
            debounce: Debouncer::new(self.debounce),
        };
        link.send(self.update_message(&open.document));
        for message in overlay_messages(self.registry.get(&document), open.visible_range()) {
            link.send(message);
        }
        log::debug!("view {view} attached to {document}");
        self.views.insert(view, link);
        Ok(())
    }

    fn view_message(&mut self, view: ViewId, message: ViewMessage, now: Instant) -> Result<(), HostError> {
        let document = self
            .views
            .get(&view)
            .map(|link| link.document.clone())
            .ok_or(HostError::UnknownView(view))?;

        match message {
            ViewMessage::Edit { text, range } => {
                let edit = match range {
                    Some(range) => Edit::Replace { range, text },
                    None => Edit::ReplaceAll { text },
                };
                self.edit(&document, edit, now)
            }
            ViewMessage::Cursor { line, character } => {
                self.selection_changed(&document, SourcePosition::new(line, character))
            }
            ViewMessage::InsertWikiLink { position, text } => self.edit(
                &document,
                Edit::Insert {
                    at: position,
                    text: WikiLink::markup(&text),
                },
                now,
            ),
            ViewMessage::RequestContent => {
                let open = self
                    .documents
                    .get(&document)
                    .ok_or_else(|| HostError::UnknownDocument(document.clone()))?;
                if let Some(link) = self.views.get(&view) {
                    link.send(self.update_message(&open.document));
                }
                Ok(())
            }
            ViewMessage::OpenWikiLink { link } => self.open_wiki_link(&link),
            ViewMessage::FocusModeChange { mode } => {
                self.set_focus_mode(mode, now);
                Ok(())
            }
        }
    }

    fn edit(&mut self, id: &DocumentId, edit: Edit, now: Instant) -> Result<(), HostError> {
        let open = self
            .documents
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownDocument(id.clone()))?;
        let Some(version) = open.document.apply(edit)? else {
            return Ok(());
        };

        let regions = RegionScanner::new(&self.renderer).scan(&open.document.lines());
        let visible_range = open.visible_range();
        log::debug!("{id} v{version}: rescanned into {} regions", regions.len());

        for link in self.views.values_mut().filter(|link| &link.document == id) {
            for message in overlay_messages(&regions, visible_range) {
                link.send(message);
            }
            link.debounce.notify(now);
        }
        let text = open.document.text();
        self.registry.update(id.clone(), regions);
        self.notify(HostNotice::DocumentChanged {
            document: id.clone(),
            version,
            text,
        });
        Ok(())
    }

    /// Host caret moved: overlays show only while the caret is outside
    /// every region.
    fn selection_changed(&mut self, id: &DocumentId, position: SourcePosition) -> Result<(), HostError> {
        let open = self
            .documents
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownDocument(id.clone()))?;
        open.document.set_cursor(position);
        let line = open.document.cursor().line;
        let visible = !self.registry.line_in_region(id, line);
        self.broadcast(id, |_| HostMessage::SetVisibility { visible });
        Ok(())
    }

    fn set_focus_mode(&mut self, mode: FocusMode, now: Instant) {
        if self.preview.focus_mode() == mode {
            return;
        }
        log::debug!("focus mode: {mode}");
        self.preview.set_focus_mode(mode);
        for link in self.views.values_mut() {
            link.debounce.notify(now);
        }
    }

    fn open_wiki_link(&mut self, link: &str) -> Result<(), HostError> {
        let resolver = self.resolver.as_ref().ok_or(WikiLinkError::NoWorkspace)?;
        let resolved = resolver.open_or_create(link)?;
        let created = matches!(resolved, ResolvedLink::Created(_));
        self.notify(HostNotice::OpenFile {
            path: resolved.path().to_path_buf(),
            created,
        });
        Ok(())
    }

    /// Sends a debounced `update` to every view whose window has passed.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let mut sent = 0;
        for link in self.views.values_mut() {
            if !link.debounce.take_due(now) {
                continue;
            }
            let Some(open) = self.documents.get(&link.document) else {
                continue;
            };
            let text = open.document.text();
            let html = self.preview.render(&text);
            link.send(HostMessage::Update {
                text,
                html: Some(html),
            });
            sent += 1;
        }
        if sent > 0 {
            log::debug!("flushed {sent} debounced updates");
        }
        sent
    }

    fn update_message(&self, document: &Document) -> HostMessage {
        let text = document.text();
        let html = self.preview.render(&text);
        HostMessage::Update {
            text,
            html: Some(html),
        }
    }

    fn scan(&self, document: &Document) -> Vec<OverlayRegion> {
        RegionScanner::new(&self.renderer).scan(&document.lines())
    }

    fn broadcast(&self, id: &DocumentId, message: impl Fn(&ViewLink) -> HostMessage) {
        for link in self.views.values().filter(|link| &link.document == id) {
            link.send(message(link));
        }
    }

    fn notify(&self, notice: HostNotice) {
        if let Some(notices) = &self.notices
            && notices.send(notice).is_err()
        {
            log::debug!("notice receiver closed");
        }
    }

    /// Runs the host until `inbox` closes, then returns it.
    ///
    /// Events are handled one at a time; debounced updates fire between
    /// events as their deadlines pass.
    pub async fn run(mut self, mut inbox: UnboundedReceiver<HostEvent>) -> Self {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                event = inbox.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle(event, Instant::now()) {
                            log::warn!("host event failed: {e}");
                        }
                    }
                    None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.flush_due(Instant::now());
                }
            }
        }
        log::debug!("host inbox closed");
        self
    }

    /// Spawns [`DocumentHost::run`] on the current runtime.
    pub fn spawn(self) -> (UnboundedSender<HostEvent>, JoinHandle<Self>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, tokio::spawn(self.run(rx)))
    }
}

/// The overlay refresh sent after every scan.
fn overlay_messages(regions: &[OverlayRegion], visible_range: VisibleRange) -> [HostMessage; 3] {
    [
        HostMessage::UpdateOverlays {
            overlays: regions.to_vec(),
        },
        HostMessage::PositionUpdate { visible_range },
        HostMessage::SetVisibility { visible: true },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{MathOptions, MathRenderer, OverlayKind, RenderError};
    use crate::tests::create_test_workspace;
    use std::sync::Arc;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    struct Fixture {
        host: DocumentHost,
        doc: DocumentId,
        view: ViewId,
        rx: UnboundedReceiver<HostMessage>,
        start: Instant,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let mut host = DocumentHost::default();
            let doc = DocumentId::from("note.md");
            let view = ViewId::new();
            let (tx, rx) = mpsc::unbounded_channel();
            let start = Instant::now();
            host.handle(
                HostEvent::Open {
                    document: doc.clone(),
                    text: text.into(),
                },
                start,
            )
            .unwrap();
            host.handle(
                HostEvent::Attach {
                    view,
                    document: doc.clone(),
                    outbox: tx,
                },
                start,
            )
            .unwrap();
            Self {
                host,
                doc,
                view,
                rx,
                start,
            }
        }

        fn drain(&mut self) -> Vec<HostMessage> {
            let mut out = Vec::new();
            while let Ok(message) = self.rx.try_recv() {
                out.push(message);
            }
            out
        }

        fn kinds(&mut self) -> Vec<&'static str> {
            self.drain().iter().map(HostMessage::kind).collect()
        }

        fn send(&mut self, message: ViewMessage, at: Instant) -> Result<(), HostError> {
            self.host.handle(
                HostEvent::FromView {
                    view: self.view,
                    message,
                },
                at,
            )
        }

        fn edit(&mut self, text: &str, at: Instant) {
            self.send(
                ViewMessage::Edit {
                    text: text.into(),
                    range: None,
                },
                at,
            )
            .unwrap();
        }
    }

    #[test]
    fn attach_sends_content_and_overlays() {
        let mut fx = Fixture::new("# Title\n\nSome text");
        let messages = fx.drain();
        assert_eq!(
            messages.iter().map(HostMessage::kind).collect::<Vec<_>>(),
            vec!["update", "updateOverlays", "positionUpdate", "setVisibility"]
        );
        let HostMessage::PositionUpdate { visible_range } = &messages[2] else {
            panic!("expected positionUpdate");
        };
        assert_eq!(*visible_range, VisibleRange { start: 0, end: 2 });
    }

    #[test]
    fn edit_rescans_immediately_and_debounces_update() {
        let mut fx = Fixture::new("text");
        fx.drain();

        fx.edit("# Heading", fx.start);
        assert_eq!(fx.kinds(), vec!["updateOverlays", "positionUpdate", "setVisibility"]);
        assert_eq!(fx.host.registry().get(&fx.doc)[0].kind(), OverlayKind::Heading);

        assert_eq!(fx.host.flush_due(fx.start + MS * 299), 0);
        assert_eq!(fx.host.flush_due(fx.start + MS * 300), 1);
        assert_eq!(fx.kinds(), vec!["update"]);
    }

    #[test]
    fn burst_of_edits_yields_one_update_with_final_text() {
        let mut fx = Fixture::new("");
        fx.drain();

        for (i, text) in ["a", "ab", "abc", "abcd"].into_iter().enumerate() {
            fx.edit(text, fx.start + MS * 100 * i as u32);
        }
        fx.drain();

        assert_eq!(fx.host.flush_due(fx.start + MS * 599), 0);
        assert_eq!(fx.host.flush_due(fx.start + MS * 600), 1);
        let updates = fx.drain();
        assert_eq!(updates.len(), 1);
        let HostMessage::Update { text, html } = &updates[0] else {
            panic!("expected update");
        };
        assert_eq!(text, "abcd");
        assert!(html.as_deref().unwrap().contains("abcd"));
    }

    #[test]
    fn identical_edit_is_ignored() {
        let mut fx = Fixture::new("same");
        fx.drain();
        fx.edit("same", fx.start);
        assert!(fx.drain().is_empty());
        assert!(fx.host.next_deadline().is_none());
    }

    #[test]
    fn request_content_skips_debounce() {
        let mut fx = Fixture::new("body");
        fx.drain();
        fx.send(ViewMessage::RequestContent, fx.start).unwrap();
        assert_eq!(fx.kinds(), vec!["update"]);
    }

    #[test]
    fn ranged_edit_and_wiki_link_insert() {
        let mut fx = Fixture::new("one\ntwo");
        fx.send(
            ViewMessage::InsertWikiLink {
                position: SourcePosition::new(1, 3),
                text: "Page".into(),
            },
            fx.start,
        )
        .unwrap();
        assert_eq!(fx.host.document(&fx.doc).unwrap().text(), "one\ntwo[[Page]]");

        let err = fx
            .send(
                ViewMessage::InsertWikiLink {
                    position: SourcePosition::new(7, 0),
                    text: "Nope".into(),
                },
                fx.start,
            )
            .unwrap_err();
        assert!(matches!(err, HostError::PositionOutOfRange { .. }));
    }

    #[test]
    fn reversed_edit_range_leaves_document_alone() {
        let mut fx = Fixture::new("ab\ncd");
        fx.drain();
        let err = fx
            .send(
                ViewMessage::Edit {
                    text: "X".into(),
                    range: Some(SourceRange {
                        start: SourcePosition::new(1, 1),
                        end: SourcePosition::new(0, 0),
                    }),
                },
                fx.start,
            )
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidRange { .. }));
        assert_eq!(fx.host.document(&fx.doc).unwrap().text(), "ab\ncd");
        assert!(fx.drain().is_empty());
        assert!(fx.host.next_deadline().is_none());
    }

    #[test]
    fn caret_inside_region_hides_overlays() {
        let mut fx = Fixture::new("intro\n$$\nx\n$$\noutro");
        fx.drain();

        fx.send(ViewMessage::Cursor { line: 2, character: 0 }, fx.start)
            .unwrap();
        assert_eq!(fx.drain(), vec![HostMessage::SetVisibility { visible: false }]);

        fx.host
            .handle(
                HostEvent::SelectionChanged {
                    document: fx.doc.clone(),
                    position: SourcePosition::new(4, 1),
                },
                fx.start,
            )
            .unwrap();
        assert_eq!(fx.drain(), vec![HostMessage::SetVisibility { visible: true }]);
    }

    #[test]
    fn visible_range_is_forwarded_and_remembered() {
        let mut fx = Fixture::new("a\nb\nc\nd");
        fx.drain();
        let range = VisibleRange { start: 1, end: 2 };
        fx.host
            .handle(
                HostEvent::VisibleRangeChanged {
                    document: fx.doc.clone(),
                    range,
                },
                fx.start,
            )
            .unwrap();
        assert_eq!(fx.drain(), vec![HostMessage::PositionUpdate { visible_range: range }]);

        fx.edit("# a\nb\nc\nd", fx.start);
        let messages = fx.drain();
        assert_eq!(messages[1], HostMessage::PositionUpdate { visible_range: range });
    }

    #[test]
    fn detach_drops_pending_update() {
        let mut fx = Fixture::new("x");
        fx.edit("y", fx.start);
        fx.host
            .handle(HostEvent::Detach { view: fx.view }, fx.start)
            .unwrap();
        assert!(fx.host.next_deadline().is_none());
        assert_eq!(fx.host.flush_due(fx.start + DEFAULT_DEBOUNCE), 0);

        let err = fx.send(ViewMessage::RequestContent, fx.start).unwrap_err();
        assert!(matches!(err, HostError::UnknownView(_)));
    }

    #[test]
    fn close_removes_registry_entry() {
        let mut fx = Fixture::new("# Title");
        assert_eq!(fx.host.registry().get(&fx.doc).len(), 1);
        fx.host
            .handle(
                HostEvent::Close {
                    document: fx.doc.clone(),
                },
                fx.start,
            )
            .unwrap();
        assert!(fx.host.registry().get(&fx.doc).is_empty());
        assert!(fx.host.document(&fx.doc).is_none());
    }

    #[test]
    fn toggle_preview_reaches_every_view() {
        let mut fx = Fixture::new("x");
        fx.drain();
        fx.host.handle(HostEvent::TogglePreview, fx.start).unwrap();
        assert_eq!(fx.kinds(), vec!["togglePreview"]);
    }

    #[test]
    fn focus_mode_change_schedules_update() {
        let mut fx = Fixture::new("x");
        fx.drain();
        fx.send(
            ViewMessage::FocusModeChange {
                mode: FocusMode::Section,
            },
            fx.start,
        )
        .unwrap();
        assert_eq!(fx.host.focus_mode(), FocusMode::Section);
        fx.host.flush_due(fx.start + DEFAULT_DEBOUNCE);
        let HostMessage::Update { html, .. } = &fx.drain()[0] else {
            panic!("expected update");
        };
        assert!(html.as_deref().unwrap().contains("data-focus-mode=\"section\""));
    }

    #[test]
    fn open_wiki_link_without_workspace_fails() {
        let mut fx = Fixture::new("x");
        let err = fx
            .send(ViewMessage::OpenWikiLink { link: "Page".into() }, fx.start)
            .unwrap_err();
        assert!(matches!(err, HostError::WikiLink(WikiLinkError::NoWorkspace)));
    }

    #[test]
    fn open_wiki_link_creates_page_and_notifies() {
        let workspace = create_test_workspace();
        let (tx, mut notices) = mpsc::unbounded_channel();
        let mut fx = Fixture::new("x");
        fx.host = std::mem::take(&mut fx.host)
            .with_resolver(WikiLinkResolver::new(workspace.path()))
            .with_notices(tx);

        fx.send(ViewMessage::OpenWikiLink { link: "Page".into() }, fx.start)
            .unwrap();
        let notice = notices.try_recv().unwrap();
        assert_eq!(
            notice,
            HostNotice::OpenFile {
                path: workspace.path().join("Page.md"),
                created: true
            }
        );
    }

    struct TexTag;

    impl MathRenderer for TexTag {
        fn render(&self, tex: &str, _options: &MathOptions) -> Result<String, RenderError> {
            Ok(format!("<tex>{tex}</tex>"))
        }
    }

    #[test]
    fn preview_math_uses_the_overlay_math_backend() {
        let mut fx = Fixture::new("Inline $a+b$ math");
        fx.host = std::mem::take(&mut fx.host)
            .with_renderer(OverlayRenderer::with_math(Arc::new(TexTag)));
        fx.drain();

        fx.send(ViewMessage::RequestContent, fx.start).unwrap();
        let HostMessage::Update { html, .. } = &fx.drain()[0] else {
            panic!("expected update");
        };
        assert!(html.as_deref().unwrap().contains("Inline <tex>a+b</tex> math"));
    }
}
