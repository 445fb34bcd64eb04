use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::OverlayRegion;

/// Identity of an open document, typically its URI or path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The current overlay regions of every open document.
///
/// Every `update` replaces the document's list outright; there is no
/// incremental merge. Sessions holding regions from an older list must
/// re-resolve them by range.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    documents: BTreeMap<DocumentId, Vec<OverlayRegion>>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the regions recorded for `document`.
    pub fn update(&mut self, document: DocumentId, regions: Vec<OverlayRegion>) {
        self.documents.insert(document, regions);
    }

    /// Regions for `document`, empty when it has never been scanned.
    pub fn get(&self, document: &DocumentId) -> &[OverlayRegion] {
        self.documents
            .get(document)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Forgets `document`, returning its last regions.
    pub fn remove(&mut self, document: &DocumentId) -> Option<Vec<OverlayRegion>> {
        self.documents.remove(document)
    }

    /// Whether any region of `document` covers `line`.
    pub fn line_in_region(&self, document: &DocumentId, line: usize) -> bool {
        self.get(document)
            .iter()
            .any(|r| r.range().contains_line(line))
    }

    /// Get the number of tracked documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
