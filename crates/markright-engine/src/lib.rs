pub mod focus;
pub mod host;
pub mod io;
pub mod overlay;
pub mod preview;
pub mod protocol;
pub mod snippets;
pub mod text;
pub mod view;
pub mod wikilink;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use focus::{FocusMode, FocusView, LineSpan, focus_range, focus_view};
pub use host::{DocumentHost, HostError, HostEvent, HostNotice, HostOptions};
pub use io::*;
pub use overlay::render::OverlayRenderer;
pub use overlay::{DocumentId, OverlayKind, OverlayRegion, OverlayRegistry, RegionScanner, scan};
pub use preview::PreviewRenderer;
pub use protocol::{HostMessage, ViewId, ViewMessage, VisibleRange};
pub use text::{SourcePosition, SourceRange};
pub use view::{ViewOptions, ViewState};
pub use wikilink::{WikiLink, WikiLinkError, WikiLinkResolver};
