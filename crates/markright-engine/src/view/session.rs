use crate::overlay::OverlayRegion;
use crate::overlay::render::OverlayRenderer;
use crate::text::{SourceRange, split_lines};

/// An in-progress edit of one region's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    target: OverlayRegion,
    original_text: String,
    value: String,
}

impl EditSession {
    fn new(target: OverlayRegion) -> Self {
        let original_text = target.raw_text().to_string();
        Self {
            value: original_text.clone(),
            original_text,
            target,
        }
    }

    pub fn target(&self) -> &OverlayRegion {
        &self.target
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Current content of the raw-text control.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.value != self.original_text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Rendered,
    Editing(EditSession),
}

/// Keys the editor controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Enter,
    Tab,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: EditorKey,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: EditorKey) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn ctrl(key: EditorKey) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn shift(key: EditorKey) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// How an edit session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// The control value was kept. `document` holds the new buffer text
    /// when the value differed from the original.
    Committed {
        region: OverlayRegion,
        document: Option<String>,
    },
    /// The control value was discarded; `region` is the untouched original.
    Cancelled { region: OverlayRegion },
}

impl SessionExit {
    pub fn region(&self) -> &OverlayRegion {
        match self {
            Self::Committed { region, .. } | Self::Cancelled { region } => region,
        }
    }

    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Committed { document, .. } => document.as_deref(),
            Self::Cancelled { .. } => None,
        }
    }
}

/// The `Rendered -> Editing -> Rendered` state machine for one view.
///
/// At most one session is active. Activating a region while another is
/// being edited commits the earlier one first.
#[derive(Debug, Default)]
pub struct RegionEditor {
    state: SessionState,
}

impl RegionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            SessionState::Editing(session) => Some(session),
            SessionState::Rendered => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.session().is_some()
    }

    /// Starts editing `region`, returning how any prior session ended.
    pub fn activate(
        &mut self,
        region: OverlayRegion,
        document: &str,
        renderer: &OverlayRenderer,
    ) -> Option<SessionExit> {
        let prior = self.commit(document, renderer);
        log::debug!(
            "editing {:?} region at lines {}..={}",
            region.kind(),
            region.start_line(),
            region.end_line()
        );
        self.state = SessionState::Editing(EditSession::new(region));
        prior
    }

    /// Replaces the control value. Ignored when no session is active.
    pub fn input(&mut self, value: impl Into<String>) {
        if let SessionState::Editing(session) = &mut self.state {
            session.value = value.into();
        }
    }

    /// Ends the session keeping the control value.
    ///
    /// A changed value is spliced over the region's lines in `document`.
    /// If those lines no longer hold the original text the splice still
    /// happens at the same line indices.
    pub fn commit(&mut self, document: &str, renderer: &OverlayRenderer) -> Option<SessionExit> {
        let SessionState::Editing(session) = std::mem::take(&mut self.state) else {
            return None;
        };

        if !session.is_dirty() {
            log::debug!("session closed without changes");
            return Some(SessionExit::Committed {
                region: session.target,
                document: None,
            });
        }

        let range = session.target.range();
        if covered_text(document, range).as_deref() != Some(session.original_text.as_str()) {
            log::warn!(
                "region at lines {}..={} changed underneath the edit session; replacing by line index",
                range.start.line,
                range.end.line
            );
        }

        let updated = splice_lines(document, range, &session.value);
        let region = session.target.with_text(&session.value, renderer);
        log::debug!("committed edit to lines {}..={}", range.start.line, range.end.line);
        Some(SessionExit::Committed {
            region,
            document: Some(updated),
        })
    }

    /// Ends the session discarding the control value.
    pub fn cancel(&mut self) -> Option<SessionExit> {
        let SessionState::Editing(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        log::debug!("edit session cancelled");
        Some(SessionExit::Cancelled {
            region: session.target,
        })
    }

    /// Escape cancels; Ctrl/Cmd+Enter saves. Other keys are left to the control.
    pub fn key(
        &mut self,
        press: KeyPress,
        document: &str,
        renderer: &OverlayRenderer,
    ) -> Option<SessionExit> {
        match press.key {
            EditorKey::Escape => self.cancel(),
            EditorKey::Enter if press.command() => self.commit(document, renderer),
            _ => None,
        }
    }

    /// Losing focus commits.
    pub fn blur(&mut self, document: &str, renderer: &OverlayRenderer) -> Option<SessionExit> {
        self.commit(document, renderer)
    }
}

/// Text currently covered by `range`'s lines, `None` if out of bounds.
fn covered_text(document: &str, range: SourceRange) -> Option<String> {
    let lines = split_lines(document);
    let covered = lines.get(range.start.line..=range.end.line)?;
    let mut text = covered.join("\n");
    if text.ends_with('\r') {
        text.pop();
    }
    Some(text)
}

/// Replaces lines `range.start.line..=range.end.line` of `document` with
/// `replacement`. Out-of-bounds ranges are clamped to the document end.
pub fn splice_lines(document: &str, range: SourceRange, replacement: &str) -> String {
    let mut lines: Vec<String> = split_lines(document).into_iter().map(str::to_string).collect();
    let start = range.start.line.min(lines.len());
    let end = (range.end.line + 1).min(lines.len()).max(start);

    let keeps_cr = end > start && lines[end - 1].ends_with('\r');
    let mut new_lines: Vec<String> = split_lines(replacement)
        .into_iter()
        .map(str::to_string)
        .collect();
    if keeps_cr && let Some(last) = new_lines.last_mut() {
        last.push('\r');
    }

    lines.splice(start..end, new_lines);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::scan;
    use pretty_assertions::assert_eq;

    const DOC: &str = "# Title\n\nSome text";

    fn first_region(document: &str) -> OverlayRegion {
        scan(&split_lines(document)).remove(0)
    }

    fn renderer() -> OverlayRenderer {
        OverlayRenderer::new()
    }

    #[test]
    fn activate_prefills_control_with_raw_text() {
        let mut editor = RegionEditor::new();
        assert!(editor.activate(first_region(DOC), DOC, &renderer()).is_none());

        let session = editor.session().unwrap();
        assert_eq!(session.value(), "# Title");
        assert_eq!(session.original_text(), "# Title");
        assert!(!session.is_dirty());
    }

    #[test]
    fn commit_splices_changed_text() {
        let mut editor = RegionEditor::new();
        editor.activate(first_region(DOC), DOC, &renderer());
        editor.input("## Title");

        let exit = editor.key(KeyPress::ctrl(EditorKey::Enter), DOC, &renderer()).unwrap();
        assert_eq!(exit.document(), Some("## Title\n\nSome text"));
        assert_eq!(exit.region().level(), Some(2));
        assert_eq!(exit.region().rendered(), "Title");
        assert!(!editor.is_editing());
    }

    #[test]
    fn unchanged_commit_leaves_document_alone() {
        let mut editor = RegionEditor::new();
        editor.activate(first_region(DOC), DOC, &renderer());

        let exit = editor.blur(DOC, &renderer()).unwrap();
        assert_eq!(exit.document(), None);
        assert_eq!(exit.region(), &first_region(DOC));
    }

    #[test]
    fn escape_discards_changes() {
        let mut editor = RegionEditor::new();
        editor.activate(first_region(DOC), DOC, &renderer());
        editor.input("garbage");

        let exit = editor.key(KeyPress::plain(EditorKey::Escape), DOC, &renderer()).unwrap();
        assert_eq!(exit, SessionExit::Cancelled { region: first_region(DOC) });
        assert!(!editor.is_editing());
    }

    #[test]
    fn plain_enter_does_not_end_session() {
        let mut editor = RegionEditor::new();
        editor.activate(first_region(DOC), DOC, &renderer());
        assert!(editor.key(KeyPress::plain(EditorKey::Enter), DOC, &renderer()).is_none());
        assert!(editor.key(KeyPress::ctrl(EditorKey::Other), DOC, &renderer()).is_none());
        assert!(editor.is_editing());
    }

    #[test]
    fn activating_another_region_commits_the_first() {
        let doc = "# One\n## Two";
        let regions = scan(&split_lines(doc));
        let mut editor = RegionEditor::new();

        editor.activate(regions[0].clone(), doc, &renderer());
        editor.input("# Uno");
        let prior = editor.activate(regions[1].clone(), doc, &renderer()).unwrap();

        assert_eq!(prior.document(), Some("# Uno\n## Two"));
        assert_eq!(editor.session().unwrap().target(), &regions[1]);
    }

    #[test]
    fn idle_editor_ignores_exits_and_input() {
        let mut editor = RegionEditor::new();
        editor.input("ignored");
        assert!(editor.commit(DOC, &renderer()).is_none());
        assert!(editor.cancel().is_none());
        assert_eq!(editor.state(), &SessionState::Rendered);
    }

    #[test]
    fn stale_range_is_replaced_by_line_index() {
        let region = first_region(DOC);
        let mut editor = RegionEditor::new();
        editor.activate(region, DOC, &renderer());
        editor.input("# New");

        let shifted = "intro\n# Title\n\nSome text";
        let exit = editor.commit(shifted, &renderer()).unwrap();
        assert_eq!(exit.document(), Some("# New\n# Title\n\nSome text"));
    }

    #[test]
    fn multi_line_replacement_grows_region() {
        let doc = "a\n$$\nx\n$$\nb";
        let mut editor = RegionEditor::new();
        editor.activate(first_region(doc), doc, &renderer());
        editor.input("$$\nx\ny\n$$");

        let exit = editor.commit(doc, &renderer()).unwrap();
        assert_eq!(exit.document(), Some("a\n$$\nx\ny\n$$\nb"));
        assert_eq!(exit.region().end_line(), 4);
    }

    #[test]
    fn splice_keeps_line_endings() {
        let doc = "# A\r\nbody\r\n";
        let range = first_region(doc).range();
        assert_eq!(splice_lines(doc, range, "# B"), "# B\r\nbody\r\n");
        assert_eq!(splice_lines(doc, range, "# A"), doc);
    }

    #[test]
    fn splice_past_end_appends() {
        let range = SourceRange::lines(9, 9, 0);
        assert_eq!(splice_lines("a", range, "b"), "a\nb");
    }
}
