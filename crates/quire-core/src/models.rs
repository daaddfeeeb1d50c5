//! Data models for Quire
//!
//! Defines the editable document structures (Document, Page, Block) and the
//! per-item reading records (ReadingState, Highlight) kept by the reading
//! state store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a block, unique within its owning document
///
/// Freshly generated ids are random, so an id is never handed out twice
/// even after the block it named has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a new random block id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of embeddable media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block of inline-marked text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: BlockId,
    /// Text with inline marks (`<b>`, `<i>`, `<u>`, `<s>`)
    pub content: String,
}

/// A block embedding an image, video or audio source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlock {
    pub id: BlockId,
    pub kind: MediaKind,
    /// Remote URL or self-contained data URI
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Minimal unit of page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Media(MediaBlock),
}

impl Block {
    /// Create a text block with a fresh id
    pub fn text(content: impl Into<String>) -> Self {
        Block::Text(TextBlock {
            id: BlockId::generate(),
            content: content.into(),
        })
    }

    /// Create a media block with a fresh id
    pub fn media(kind: MediaKind, source: impl Into<String>, caption: Option<String>) -> Self {
        Block::Media(MediaBlock {
            id: BlockId::generate(),
            kind,
            source: source.into(),
            caption,
        })
    }

    pub fn id(&self) -> &BlockId {
        match self {
            Block::Text(text) => &text.id,
            Block::Media(media) => &media.id,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Block::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(text) => Some(text),
            Block::Media(_) => None,
        }
    }

    /// Text this block contributes to a rendered page
    ///
    /// Text blocks contribute their content, media blocks their caption.
    pub fn rendered_text(&self) -> Option<&str> {
        match self {
            Block::Text(text) => Some(text.content.as_str()),
            Block::Media(media) => media.caption.as_deref(),
        }
    }
}

/// An ordered sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Block ids in page order
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id().clone()).collect()
    }

    /// Position of the block with the given id
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// Render the page as reading text, one paragraph per block
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(Block::rendered_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Publication state of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published { at: DateTime<Utc> },
}

/// Table of contents entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub target_page: usize,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, target_page: usize) -> Self {
        Self {
            title: title.into(),
            target_page,
        }
    }
}

/// An editable long-form document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Pages in reading order; the index is the only address of a page
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
    #[serde(default)]
    pub status: DocumentStatus,
}

impl Document {
    /// Create a new draft document with a single empty page
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_pages(title, vec![Page::new()])
    }

    pub fn with_pages(title: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: None,
            pages,
            toc: Vec::new(),
            status: DocumentStatus::Draft,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_published(&self) -> bool {
        matches!(self.status, DocumentStatus::Published { .. })
    }
}

/// Read-only content handed to a reading session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadContent {
    pub pages: Vec<String>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
    #[serde(default)]
    pub author: Option<String>,
}

impl ReadContent {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            toc: Vec::new(),
            author: None,
        }
    }

    /// Render an editable document into reading pages
    pub fn from_document(doc: &Document) -> Self {
        Self {
            pages: doc.pages.iter().map(Page::text).collect(),
            toc: doc.toc.clone(),
            author: doc.author.clone(),
        }
    }

    /// Split plain text into pages on form-feed characters
    pub fn from_text(text: &str) -> Self {
        let pages = text
            .split('\u{c}')
            .map(|p| p.trim_matches('\n').to_string())
            .collect();
        Self::new(pages)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }
}

/// A user-marked span of text on a page
///
/// Stored as literal text plus page index rather than an offset range, so a
/// highlight never refers to a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: Uuid,
    pub page: usize,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Highlight {
    pub fn new(page: usize, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-item reading progress, bookmarks and highlights
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingState {
    #[serde(default)]
    pub current_page: usize,
    /// Bookmarked pages, unique and ascending
    #[serde(default)]
    pub bookmarks: BTreeSet<usize>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

impl ReadingState {
    /// Add the bookmark if absent, remove it if present
    ///
    /// Returns true when the page is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, page: usize) -> bool {
        if self.bookmarks.remove(&page) {
            false
        } else {
            self.bookmarks.insert(page);
            true
        }
    }

    /// Remove a bookmark, returning whether it existed
    pub fn remove_bookmark(&mut self, page: usize) -> bool {
        self.bookmarks.remove(&page)
    }

    pub fn is_bookmarked(&self, page: usize) -> bool {
        self.bookmarks.contains(&page)
    }

    /// Shallow-merge a partial record into this one
    pub fn apply(&mut self, patch: ReadingStatePatch) {
        if let Some(page) = patch.current_page {
            self.current_page = page;
        }
        if let Some(bookmarks) = patch.bookmarks {
            self.bookmarks = bookmarks;
        }
        if let Some(highlights) = patch.highlights {
            self.highlights = highlights;
        }
    }
}

/// Partial reading state used for merge-on-write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingStatePatch {
    pub current_page: Option<usize>,
    pub bookmarks: Option<BTreeSet<usize>>,
    pub highlights: Option<Vec<Highlight>>,
}

impl ReadingStatePatch {
    pub fn current_page(page: usize) -> Self {
        Self {
            current_page: Some(page),
            ..Self::default()
        }
    }

    pub fn bookmarks(bookmarks: BTreeSet<usize>) -> Self {
        Self {
            bookmarks: Some(bookmarks),
            ..Self::default()
        }
    }

    pub fn highlights(highlights: Vec<Highlight>) -> Self {
        Self {
            highlights: Some(highlights),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_page.is_none() && self.bookmarks.is_none() && self.highlights.is_none()
    }
}

/// One search hit: the first match on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub page: usize,
    pub snippet: String,
}

/// Screen rectangle of a captured text selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ids_are_unique() {
        let a = Block::text("one");
        let b = Block::text("one");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_block_serialization_is_tagged() {
        let block = Block::media(MediaKind::Video, "https://example.com/v.mp4", None);
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "media");
        assert_eq!(json["kind"], "video");
        assert!(json.get("caption").is_none());

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_page_text_uses_captions() {
        let page = Page::with_blocks(vec![
            Block::text("Intro"),
            Block::media(MediaKind::Image, "data:image/png;base64,AA==", None),
            Block::media(
                MediaKind::Image,
                "https://example.com/a.png",
                Some("A figure".to_string()),
            ),
        ]);
        assert_eq!(page.text(), "Intro\n\nA figure");
    }

    #[test]
    fn test_document_new_has_one_page() {
        let doc = Document::new("Essay");
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert!(!doc.is_published());
    }

    #[test]
    fn test_read_content_from_text() {
        let content = ReadContent::from_text("first page\n\u{c}\nsecond page");
        assert_eq!(content.pages, vec!["first page", "second page"]);
    }

    #[test]
    fn test_read_content_from_document() {
        let mut doc = Document::with_pages(
            "Book",
            vec![
                Page::with_blocks(vec![Block::text("a"), Block::text("b")]),
                Page::new(),
            ],
        );
        doc.toc.push(TocEntry::new("Start", 0));
        let content = ReadContent::from_document(&doc);
        assert_eq!(content.pages, vec!["a\n\nb".to_string(), String::new()]);
        assert_eq!(content.toc.len(), 1);
    }

    #[test]
    fn test_bookmarks_stay_sorted() {
        let mut state = ReadingState::default();
        for page in [5, 1, 3] {
            state.toggle_bookmark(page);
        }
        assert_eq!(state.bookmarks.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("[1,3,5]"));
    }

    #[test]
    fn test_toggle_bookmark_twice_is_identity() {
        let mut state = ReadingState::default();
        state.toggle_bookmark(7);
        let before = state.clone();
        assert!(state.toggle_bookmark(3));
        assert!(!state.toggle_bookmark(3));
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_patch_is_shallow() {
        let mut state = ReadingState::default();
        state.toggle_bookmark(2);
        state.apply(ReadingStatePatch::current_page(4));
        assert_eq!(state.current_page, 4);
        assert!(state.is_bookmarked(2));

        state.apply(ReadingStatePatch::bookmarks(BTreeSet::new()));
        assert!(state.bookmarks.is_empty());
        assert_eq!(state.current_page, 4);
    }

    #[test]
    fn test_reading_state_defaults_on_missing_fields() {
        let state: ReadingState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, ReadingState::default());
    }
}
