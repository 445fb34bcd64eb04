//! Messages exchanged between the document host and rendered views.
//!
//! Both directions are JSON objects tagged by `type`. Delivery is fire and
//! forget: nothing is acknowledged, and the next `update` from the host
//! resynchronizes a view that missed something.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::focus::FocusMode;
use crate::overlay::OverlayRegion;
use crate::text::{SourcePosition, SourceRange};

/// Identity of one open view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// View -> document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewMessage {
    /// Replace the whole buffer, or only `range` when given.
    Edit {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<SourceRange>,
    },
    /// Move the host caret.
    Cursor { line: usize, character: usize },
    /// Insert `[[text]]` at `position`.
    InsertWikiLink {
        position: SourcePosition,
        text: String,
    },
    /// Resend the current content without waiting for the debounce.
    RequestContent,
    /// Open the file a wiki-link points at, creating it if needed.
    OpenWikiLink { link: String },
    FocusModeChange { mode: FocusMode },
}

/// Inclusive range of lines visible in the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

/// Document -> view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    Update {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },
    TogglePreview,
    UpdateOverlays { overlays: Vec<OverlayRegion> },
    PositionUpdate { visible_range: VisibleRange },
    SetVisibility { visible: bool },
}

impl HostMessage {
    /// The `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::TogglePreview => "togglePreview",
            Self::UpdateOverlays { .. } => "updateOverlays",
            Self::PositionUpdate { .. } => "positionUpdate",
            Self::SetVisibility { .. } => "setVisibility",
        }
    }
}
