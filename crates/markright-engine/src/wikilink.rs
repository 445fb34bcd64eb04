//! # Wiki-Links
//!
//! `[[target]]` and `[[target|display]]` references between workspace
//! files.
//!
//! - **Parsing**: finds links in a line of text with byte spans
//! - **Completion**: detects a caret inside an open `[[` and lists
//!   workspace pages as candidates
//! - **Resolution**: `target.md` anywhere in the workspace, then a file
//!   named exactly `target`; otherwise a new page is created

use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use relative_path::RelativePath;

use crate::io::{self, IoError};

#[derive(Debug, thiserror::Error)]
pub enum WikiLinkError {
    #[error("no workspace folder is configured")]
    NoWorkspace,
    #[error("invalid wiki-link target: {0:?}")]
    InvalidTarget(String),
    #[error(transparent)]
    Io(#[from] IoError),
}

/// One wiki-link occurrence within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink<'a> {
    pub target: &'a str,
    /// Alias text, or the target when there is none.
    pub display: &'a str,
    /// Byte span of the whole `[[...]]` in the parsed text.
    pub span: Range<usize>,
}

impl WikiLink<'_> {
    pub const OPEN: &'static str = "[[";
    pub const CLOSE: &'static str = "]]";
    pub const ALIAS: char = '|';

    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("Invalid wiki-link regex"))
    }

    /// Source text for a link to `target`.
    pub fn markup(target: &str) -> String {
        format!("{}{target}{}", Self::OPEN, Self::CLOSE)
    }
}

/// All wiki-links in `text`, in order. Links with a blank target are skipped.
pub fn parse_wiki_links(text: &str) -> Vec<WikiLink<'_>> {
    WikiLink::pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?.as_str();
            let (target, display) = match inner.split_once(WikiLink::ALIAS) {
                Some((target, display)) => (target.trim(), display.trim()),
                None => (inner.trim(), inner.trim()),
            };
            if target.is_empty() {
                return None;
            }
            Some(WikiLink {
                target,
                display: if display.is_empty() { target } else { display },
                span: whole.range(),
            })
        })
        .collect()
}

/// The link whose `[[...]]` span contains byte offset `index`.
pub fn wiki_link_at(line: &str, index: usize) -> Option<WikiLink<'_>> {
    parse_wiki_links(line)
        .into_iter()
        .find(|link| link.span.contains(&index))
}

/// Whether the text before the caret leaves a `[[` open.
pub fn is_inside_wiki_link(line_prefix: &str) -> bool {
    match (
        line_prefix.rfind(WikiLink::OPEN),
        line_prefix.rfind(WikiLink::CLOSE),
    ) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// How a link target was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLink {
    Existing(PathBuf),
    Created(PathBuf),
}

impl ResolvedLink {
    pub fn path(&self) -> &Path {
        match self {
            Self::Existing(path) | Self::Created(path) => path,
        }
    }
}

/// Resolves wiki-link targets against a workspace folder.
#[derive(Debug, Clone)]
pub struct WikiLinkResolver {
    root: PathBuf,
}

impl WikiLinkResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Page names offered for completion: markdown file stems, sorted.
    pub fn candidates(&self) -> Result<Vec<String>, WikiLinkError> {
        let mut names: Vec<String> = io::scan_markdown_files(&self.root)?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Finds an existing file for `target`, preferring `target.md`.
    pub fn resolve(&self, target: &str) -> Result<Option<PathBuf>, WikiLinkError> {
        let target = validate_target(target)?;
        let files = io::scan_files(&self.root, false)?;
        let with_extension = format!("{target}.md");

        for wanted in [with_extension.as_str(), target] {
            let wanted = Path::new(wanted);
            let found = files.iter().find(|path| {
                path.strip_prefix(&self.root)
                    .is_ok_and(|relative| relative.ends_with(wanted))
            });
            if let Some(path) = found {
                return Ok(Some(path.clone()));
            }
        }
        Ok(None)
    }

    /// Resolves `target`, creating `<root>/target.md` with a heading when
    /// nothing matches.
    pub fn open_or_create(&self, target: &str) -> Result<ResolvedLink, WikiLinkError> {
        if let Some(path) = self.resolve(target)? {
            return Ok(ResolvedLink::Existing(path));
        }

        let target = validate_target(target)?;
        let relative = format!("{target}.md");
        let path = io::write_file(
            RelativePath::new(&relative),
            &self.root,
            &format!("# {target}\n\n"),
        )?;
        log::info!("created wiki page {}", path.display());
        Ok(ResolvedLink::Created(path))
    }
}

/// Rejects targets that are blank or would escape the workspace.
fn validate_target(target: &str) -> Result<&str, WikiLinkError> {
    let trimmed = target.trim();
    let escapes = Path::new(trimmed)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if trimmed.is_empty() || escapes {
        return Err(WikiLinkError::InvalidTarget(target.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_workspace};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_plain_and_aliased_links() {
        let links = parse_wiki_links("See [[Page One]] and [[ notes/two | the second ]].");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, "Page One");
        assert_eq!(links[0].display, "Page One");
        assert_eq!(links[0].span, 4..16);
        assert_eq!(links[1].target, "notes/two");
        assert_eq!(links[1].display, "the second");
    }

    #[test]
    fn blank_targets_are_skipped() {
        assert!(parse_wiki_links("[[ ]] [[|alias]]").is_empty());
        assert!(parse_wiki_links("[[]]").is_empty());
    }

    #[test]
    fn link_at_finds_enclosing_span() {
        let line = "a [[One]] b [[Two]]";
        assert_eq!(wiki_link_at(line, 5).unwrap().target, "One");
        assert_eq!(wiki_link_at(line, 13).unwrap().target, "Two");
        assert!(wiki_link_at(line, 10).is_none());
    }

    #[rstest]
    #[case("text [[", true)]
    #[case("text [[Pa", true)]
    #[case("[[Done]] then [[op", true)]
    #[case("[[Done]] after", false)]
    #[case("no link", false)]
    fn detects_open_link(#[case] prefix: &str, #[case] inside: bool) {
        assert_eq!(is_inside_wiki_link(prefix), inside);
    }

    #[test]
    fn candidates_are_markdown_stems() {
        let workspace = create_test_workspace();
        create_test_file(&workspace, "beta.md", "");
        create_test_file(&workspace, "sub/alpha.md", "");
        create_test_file(&workspace, "image.png", "");

        let resolver = WikiLinkResolver::new(workspace.path());
        assert_eq!(resolver.candidates().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn resolve_prefers_markdown_file() {
        let workspace = create_test_workspace();
        create_test_file(&workspace, "Page", "bare");
        let md = create_test_file(&workspace, "deep/Page.md", "# Page");

        let resolver = WikiLinkResolver::new(workspace.path());
        assert_eq!(resolver.resolve("Page").unwrap(), Some(md));
    }

    #[test]
    fn resolve_falls_back_to_exact_name() {
        let workspace = create_test_workspace();
        let bare = create_test_file(&workspace, "notes.txt", "x");

        let resolver = WikiLinkResolver::new(workspace.path());
        assert_eq!(resolver.resolve("notes.txt").unwrap(), Some(bare));
        assert_eq!(resolver.resolve("missing").unwrap(), None);
    }

    #[test]
    fn missing_target_is_created() {
        let workspace = create_test_workspace();
        let resolver = WikiLinkResolver::new(workspace.path());

        let resolved = resolver.open_or_create("New Page").unwrap();
        let ResolvedLink::Created(path) = &resolved else {
            panic!("expected a created page, got {resolved:?}");
        };
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# New Page\n\n");

        let again = resolver.open_or_create("New Page").unwrap();
        assert_eq!(again, ResolvedLink::Existing(path.clone()));
    }

    #[rstest]
    #[case("../outside")]
    #[case("/etc/passwd")]
    #[case("   ")]
    fn escaping_targets_are_rejected(#[case] target: &str) {
        let workspace = create_test_workspace();
        let resolver = WikiLinkResolver::new(workspace.path());
        assert!(matches!(
            resolver.open_or_create(target),
            Err(WikiLinkError::InvalidTarget(_))
        ));
    }
}
