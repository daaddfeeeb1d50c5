//! Editing sessions
//!
//! An [`EditingSession`] owns a [`Document`] while it is being edited and
//! turns user intent into document operations:
//!
//! - the block insertion menu (`text | image | video | audio`)
//! - the selection toolbar, which toggles inline marks in the focused
//!   block's buffer
//! - blur-driven commits of text edits
//! - drag-and-drop reordering
//! - save and publish through a [`DocumentSink`]
//!
//! Local media is ingested asynchronously. The insertion target is captured
//! in a [`PendingMediaInsert`] before the conversion starts and re-validated
//! against the document when it completes.

pub mod media;
pub mod selection;

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::DocumentError;
use crate::markup::{self, InlineMark, Toggled};
use crate::models::{Block, BlockId, Document, DocumentStatus, MediaKind};
use crate::notice::{Notice, Notices};
use crate::storage::{DocumentSink, StorageError};

pub use media::{accept_url, ingest_file, FileIngest, IngestError, MediaIngest};
pub use selection::{TextSelection, Toolbar};

/// Errors surfaced by an editing session
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Failed to save document: {0}")]
    Storage(#[from] StorageError),
}

/// Entries of the block insertion menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Video,
    Audio,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Audio,
    ];

    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            BlockKind::Text => None,
            BlockKind::Image => Some(MediaKind::Image),
            BlockKind::Video => Some(MediaKind::Video),
            BlockKind::Audio => Some(MediaKind::Audio),
        }
    }
}

/// Insertion target captured before an asynchronous media conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMediaInsert {
    pub page: usize,
    pub index: usize,
    pub kind: MediaKind,
}

/// What choosing an insertion menu entry did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(BlockId),
    /// A local file must be ingested before the block can be inserted
    Pending(PendingMediaInsert),
    Cancelled,
}

/// Text block currently being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedBlock {
    pub page: usize,
    pub block_id: BlockId,
    /// Uncommitted content
    pub buffer: String,
}

/// Editing session over one document
#[derive(Debug)]
pub struct EditingSession {
    doc: Document,
    current_page: usize,
    focused: Option<FocusedBlock>,
    toolbar: Option<Toolbar>,
    dirty: bool,
    notices: Notices,
}

impl EditingSession {
    pub fn new(doc: Document) -> Self {
        debug!("Opened editing session for {} ({} pages)", doc.id, doc.page_count());
        Self {
            doc,
            current_page: 0,
            focused: None,
            toolbar: None,
            dirty: false,
            notices: Notices::default(),
        }
    }

    // ==================== Accessors ====================

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// End the session and hand the document back, committing any edit
    pub fn into_document(mut self) -> Result<Document, EditorError> {
        self.blur()?;
        Ok(self.doc)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn focused(&self) -> Option<&FocusedBlock> {
        self.focused.as_ref()
    }

    pub fn toolbar(&self) -> Option<&Toolbar> {
        self.toolbar.as_ref()
    }

    /// Whether there are changes not yet saved or published
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.has_pending_edit()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    fn has_pending_edit(&self) -> bool {
        self.focused.as_ref().is_some_and(|f| {
            self.doc
                .find_block(f.page, &f.block_id)
                .and_then(Block::as_text)
                .is_some_and(|t| t.content != f.buffer)
        })
    }

    // ==================== Navigation ====================

    /// Show page `index`, clamped into the document
    pub fn go_to_page(&mut self, index: usize) -> Result<usize, EditorError> {
        self.blur()?;
        self.current_page = index.min(self.doc.page_count().saturating_sub(1));
        Ok(self.current_page)
    }

    // ==================== Insertion menu ====================

    pub fn insert_options(&self) -> &'static [BlockKind] {
        &BlockKind::ALL
    }

    /// Act on an insertion menu choice
    ///
    /// Text is inserted immediately. Image asks the host for a local file
    /// and returns the captured target. Video and audio use `url`; a missing
    /// or blank URL cancels.
    pub fn choose(
        &mut self,
        page: usize,
        index: usize,
        kind: BlockKind,
        url: Option<&str>,
    ) -> Result<InsertOutcome, EditorError> {
        let remote = match kind {
            BlockKind::Text => return Ok(InsertOutcome::Inserted(self.insert_text(page, index)?)),
            BlockKind::Image => {
                let pending = self.begin_local_media(page, index, MediaKind::Image)?;
                return Ok(InsertOutcome::Pending(pending));
            }
            BlockKind::Video => MediaKind::Video,
            BlockKind::Audio => MediaKind::Audio,
        };

        Ok(match self.insert_remote_media(page, index, remote, url)? {
            Some(id) => InsertOutcome::Inserted(id),
            None => InsertOutcome::Cancelled,
        })
    }

    /// Insert an empty text block
    pub fn insert_text(&mut self, page: usize, index: usize) -> Result<BlockId, EditorError> {
        self.insert(page, index, Block::text(""))
    }

    /// Insert a media block referencing a remote URL
    ///
    /// Returns `None` without touching the document when the URL is missing
    /// or blank.
    pub fn insert_remote_media(
        &mut self,
        page: usize,
        index: usize,
        kind: MediaKind,
        url: Option<&str>,
    ) -> Result<Option<BlockId>, EditorError> {
        let source = match accept_url(url) {
            Ok(source) => source,
            Err(_) => {
                debug!("Media insertion cancelled (no URL)");
                return Ok(None);
            }
        };
        self.insert(page, index, Block::media(kind, source, None))
            .map(Some)
    }

    /// Capture the target of a local media insertion
    pub fn begin_local_media(
        &self,
        page: usize,
        index: usize,
        kind: MediaKind,
    ) -> Result<PendingMediaInsert, EditorError> {
        let len = self.doc.page(page)?.blocks.len();
        if index > len {
            return Err(DocumentError::BlockOutOfRange { page, index, len }.into());
        }
        Ok(PendingMediaInsert { page, index, kind })
    }

    /// Apply a finished media conversion at the captured target
    ///
    /// The page must still exist. If blocks were removed meanwhile and the
    /// captured index is past the end, the block is appended instead.
    /// Conversion failures queue an error notice; a missing file capability
    /// is also returned as an error, other failures insert nothing.
    pub fn complete_local_media(
        &mut self,
        pending: PendingMediaInsert,
        result: Result<String, IngestError>,
    ) -> Result<Option<BlockId>, EditorError> {
        let source = match result {
            Ok(source) => source,
            Err(err @ IngestError::Unavailable(_)) => {
                self.notices.push(Notice::error(err.to_string()));
                return Err(err.into());
            }
            Err(err) => {
                warn!("Media ingestion failed: {}", err);
                self.notices.push(Notice::error(err.to_string()));
                return Ok(None);
            }
        };

        let len = self.doc.page(pending.page)?.blocks.len();
        let index = if pending.index > len {
            warn!(
                "Insertion index {} on page {} is stale ({} blocks), appending",
                pending.index, pending.page, len
            );
            self.notices
                .push(Notice::warning("Content changed; media added at the end of the page"));
            len
        } else {
            pending.index
        };

        self.insert(pending.page, index, Block::media(pending.kind, source, None))
            .map(Some)
    }

    /// Ingest a local file and insert it at the captured target
    pub async fn insert_local_media<I: MediaIngest>(
        &mut self,
        ingest: &I,
        page: usize,
        index: usize,
        kind: MediaKind,
        path: &Path,
    ) -> Result<Option<BlockId>, EditorError> {
        let pending = self.begin_local_media(page, index, kind)?;
        let result = ingest.ingest(path).await;
        self.complete_local_media(pending, result)
    }

    fn insert(&mut self, page: usize, index: usize, block: Block) -> Result<BlockId, EditorError> {
        let id = block.id().clone();
        self.doc.insert_block(page, index, block)?;
        self.dirty = true;
        debug!("Inserted block {} at {}:{}", id, page, index);
        Ok(id)
    }

    // ==================== Selection toolbar ====================

    /// Pointer released over the editing surface
    ///
    /// A non-empty selection inside a text block on the displayed page
    /// focuses that block and shows the toolbar. Anything else hides it.
    pub fn on_pointer_release(&mut self, selection: Option<TextSelection>) -> Result<bool, EditorError> {
        let Some(selection) = selection.filter(|s| self.is_selectable(s)) else {
            self.toolbar = None;
            return Ok(false);
        };

        self.focus_block(selection.page, &selection.block_id)?;
        let valid = self
            .focused
            .as_ref()
            .is_some_and(|f| markup::is_valid_range(&f.buffer, &selection.range));

        self.toolbar = valid.then_some(Toolbar { selection });
        Ok(valid)
    }

    fn is_selectable(&self, selection: &TextSelection) -> bool {
        !selection.is_empty()
            && selection.page == self.current_page
            && self
                .doc
                .find_block(selection.page, &selection.block_id)
                .is_some_and(Block::is_text)
    }

    /// Any non-selecting interaction closes the toolbar
    pub fn on_pointer_down(&mut self) {
        self.toolbar = None;
    }

    pub fn dismiss_toolbar(&mut self) {
        self.toolbar = None;
    }

    /// Toggle `mark` over the toolbar's selection and close the toolbar
    ///
    /// The change lands in the focused block's buffer and is committed to
    /// the document on blur.
    pub fn apply_format(&mut self, mark: InlineMark) -> Option<Toggled> {
        let toolbar = self.toolbar.take()?;
        let focused = self
            .focused
            .as_mut()
            .filter(|f| f.block_id == toolbar.selection.block_id)?;

        let toggled = markup::toggle_mark(&focused.buffer, toolbar.selection.range, mark)?;
        focused.buffer = toggled.content.clone();
        debug!(
            "{} {:?} in block {}",
            if toggled.applied { "Applied" } else { "Removed" },
            mark,
            focused.block_id
        );
        Some(toggled)
    }

    // ==================== Focus & commit ====================

    /// Start editing a text block, committing the previously focused one
    ///
    /// Returns false when the block is missing or not a text block.
    pub fn focus_block(&mut self, page: usize, id: &BlockId) -> Result<bool, EditorError> {
        if self
            .focused
            .as_ref()
            .is_some_and(|f| f.page == page && &f.block_id == id)
        {
            return Ok(true);
        }

        self.blur()?;
        let Some(text) = self.doc.find_block(page, id).and_then(Block::as_text) else {
            return Ok(false);
        };

        self.focused = Some(FocusedBlock {
            page,
            block_id: id.clone(),
            buffer: text.content.clone(),
        });
        Ok(true)
    }

    /// Replace the focused block's uncommitted content
    pub fn update_buffer(&mut self, content: impl Into<String>) -> bool {
        match self.focused.as_mut() {
            Some(focused) => {
                focused.buffer = content.into();
                self.toolbar = None;
                true
            }
            None => false,
        }
    }

    /// Leave the focused block, committing its buffer
    ///
    /// Returns whether the document changed. A block deleted while focused
    /// is skipped silently.
    pub fn blur(&mut self) -> Result<bool, EditorError> {
        self.toolbar = None;
        let Some(focused) = self.focused.take() else {
            return Ok(false);
        };

        let unchanged = self
            .doc
            .find_block(focused.page, &focused.block_id)
            .and_then(Block::as_text)
            .is_some_and(|t| t.content == focused.buffer);
        if unchanged {
            return Ok(false);
        }

        let committed = self
            .doc
            .edit_text_block(focused.page, &focused.block_id, focused.buffer)?;
        if committed {
            self.dirty = true;
            debug!("Committed edit to block {}", focused.block_id);
        }
        Ok(committed)
    }

    // ==================== Structure ====================

    /// Apply a drag-and-drop ordering to a page
    pub fn reorder(&mut self, page: usize, new_order: &[BlockId]) -> Result<(), EditorError> {
        self.doc.reorder_blocks(page, new_order)?;
        self.dirty = true;
        Ok(())
    }

    /// Delete a block; missing ids are a no-op
    pub fn delete_block(&mut self, page: usize, id: &BlockId) -> Result<bool, EditorError> {
        if self.focused.as_ref().is_some_and(|f| &f.block_id == id) {
            self.focused = None;
            self.toolbar = None;
        }
        let removed = self.doc.delete_block(page, id)?.is_some();
        self.dirty |= removed;
        Ok(removed)
    }

    pub fn set_caption(
        &mut self,
        page: usize,
        id: &BlockId,
        caption: Option<String>,
    ) -> Result<bool, EditorError> {
        let caption = caption.filter(|c| !c.trim().is_empty());
        let changed = self.doc.set_media_caption(page, id, caption)?;
        self.dirty |= changed;
        Ok(changed)
    }

    /// Insert an empty page at `index`
    pub fn add_page(&mut self, index: usize) -> Result<(), EditorError> {
        self.blur()?;
        self.doc.insert_page(index)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove the page at `index`; the document always keeps one page
    pub fn remove_page(&mut self, index: usize) -> Result<(), EditorError> {
        self.blur()?;
        self.doc.remove_page(index)?;
        if self.doc.pages.is_empty() {
            self.doc.pages.push(Default::default());
        }
        self.current_page = self.current_page.min(self.doc.page_count() - 1);
        self.dirty = true;
        Ok(())
    }

    // ==================== Save / publish ====================

    /// Commit pending edits and save the document as a draft
    pub fn save<S: DocumentSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), EditorError> {
        self.blur()?;
        sink.save_draft(&self.doc)?;
        self.dirty = false;
        info!("Saved draft of {}", self.doc.id);
        Ok(())
    }

    /// Commit pending edits, mark the document published and hand it off
    pub fn publish<S: DocumentSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), EditorError> {
        self.blur()?;
        let previous = std::mem::replace(
            &mut self.doc.status,
            DocumentStatus::Published { at: Utc::now() },
        );
        if let Err(e) = sink.publish(&self.doc) {
            self.doc.status = previous;
            return Err(e.into());
        }
        self.dirty = false;
        info!("Published {}", self.doc.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::media::fake::FakeIngest;
    use super::*;
    use crate::models::Page;
    use crate::notice::NoticeLevel;
    use crate::storage::StorageResult;

    #[derive(Default)]
    struct RecordingSink {
        drafts: Vec<Document>,
        published: Vec<Document>,
    }

    impl DocumentSink for RecordingSink {
        fn save_draft(&mut self, doc: &Document) -> StorageResult<()> {
            self.drafts.push(doc.clone());
            Ok(())
        }

        fn publish(&mut self, doc: &Document) -> StorageResult<()> {
            self.published.push(doc.clone());
            Ok(())
        }
    }

    fn session() -> (EditingSession, BlockId, BlockId) {
        let first = Block::text("Hello world");
        let second = Block::media(MediaKind::Image, "https://example.com/a.png", None);
        let (a, b) = (first.id().clone(), second.id().clone());
        let doc = Document::with_pages(
            "Draft",
            vec![Page::with_blocks(vec![first, second]), Page::new()],
        );
        (EditingSession::new(doc), a, b)
    }

    fn ids(session: &EditingSession, page: usize) -> Vec<BlockId> {
        session.document().page(page).unwrap().block_ids()
    }

    fn content(session: &EditingSession, id: &BlockId) -> String {
        session
            .document()
            .find_block(0, id)
            .and_then(Block::as_text)
            .map(|t| t.content.clone())
            .unwrap()
    }

    #[test]
    fn test_insert_text_block() {
        let (mut session, a, b) = session();
        let outcome = session.choose(0, 1, BlockKind::Text, None).unwrap();
        let InsertOutcome::Inserted(id) = outcome else {
            panic!("expected insertion");
        };
        assert_eq!(ids(&session, 0), vec![a, id.clone(), b]);
        assert_eq!(content(&session, &id), "");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_insert_options() {
        let (session, _, _) = session();
        assert_eq!(session.insert_options().len(), 4);
    }

    #[test]
    fn test_remote_media_requires_url() {
        let (mut session, _, _) = session();
        assert_eq!(
            session.choose(1, 0, BlockKind::Video, Some("  ")).unwrap(),
            InsertOutcome::Cancelled
        );
        assert_eq!(
            session.choose(1, 0, BlockKind::Audio, None).unwrap(),
            InsertOutcome::Cancelled
        );
        assert!(session.document().page(1).unwrap().blocks.is_empty());
        assert!(!session.is_dirty());

        let outcome = session
            .choose(1, 0, BlockKind::Audio, Some("https://example.com/a.mp3"))
            .unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted(_)));
        match &session.document().page(1).unwrap().blocks[0] {
            Block::Media(media) => {
                assert_eq!(media.kind, MediaKind::Audio);
                assert_eq!(media.source, "https://example.com/a.mp3");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_insert_out_of_range() {
        let (mut session, _, _) = session();
        let err = session.insert_text(0, 5).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Document(DocumentError::BlockOutOfRange { .. })
        ));
        assert!(session.choose(7, 0, BlockKind::Image, None).is_err());
    }

    #[tokio::test]
    async fn test_local_media_inserted_at_captured_target() {
        let (mut session, a, b) = session();
        let ingest = FakeIngest::returning("data:image/png;base64,AA==");
        let id = session
            .insert_local_media(&ingest, 0, 1, MediaKind::Image, Path::new("a.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&session, 0), vec![a, id, b]);
    }

    #[test]
    fn test_stale_media_target_is_clamped() {
        let (mut session, a, b) = session();
        let InsertOutcome::Pending(pending) = session.choose(0, 2, BlockKind::Image, None).unwrap()
        else {
            panic!("expected pending insertion");
        };

        session.delete_block(0, &b).unwrap();
        let id = session
            .complete_local_media(pending, Ok("data:image/png;base64,AA==".to_string()))
            .unwrap()
            .unwrap();

        assert_eq!(ids(&session, 0), vec![a, id]);
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn test_stale_media_page_fails() {
        let (mut session, _, _) = session();
        let pending = session.begin_local_media(1, 0, MediaKind::Image).unwrap();
        session.remove_page(1).unwrap();

        let err = session
            .complete_local_media(pending, Ok("data:,".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::Document(DocumentError::PageOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_ingest_unavailable_propagates_with_notice() {
        let (mut session, _, _) = session();
        let before = session.document().clone();
        let err = session
            .insert_local_media(&FakeIngest::unavailable(), 0, 0, MediaKind::Image, Path::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Ingest(IngestError::Unavailable(_))));
        assert_eq!(session.document(), &before);
        assert_eq!(session.take_notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_ingest_read_failure_is_notice_only() {
        let (mut session, _, _) = session();
        let pending = session.begin_local_media(0, 0, MediaKind::Image).unwrap();
        let failure = IngestError::Read {
            path: "x.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(session.complete_local_media(pending, Err(failure)).unwrap().is_none());
        assert_eq!(session.take_notices().len(), 1);
        assert_eq!(session.document().page(0).unwrap().blocks.len(), 2);
    }

    #[test]
    fn test_format_commits_on_blur() {
        let (mut session, a, _) = session();
        let shown = session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 0..5)))
            .unwrap();
        assert!(shown);
        assert!(session.toolbar().is_some());

        let toggled = session.apply_format(InlineMark::Bold).unwrap();
        assert!(toggled.applied);
        assert!(session.toolbar().is_none());
        assert_eq!(content(&session, &a), "Hello world");
        assert!(session.is_dirty());

        assert!(session.blur().unwrap());
        assert_eq!(content(&session, &a), "<b>Hello</b> world");
    }

    #[test]
    fn test_format_toggle_off() {
        let (mut session, a, _) = session();
        session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 6..11)))
            .unwrap();
        let toggled = session.apply_format(InlineMark::Italic).unwrap();

        session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), toggled.selection)))
            .unwrap();
        let toggled = session.apply_format(InlineMark::Italic).unwrap();
        assert!(!toggled.applied);
        session.blur().unwrap();
        assert_eq!(content(&session, &a), "Hello world");
    }

    #[test]
    fn test_format_refuses_selection_splitting_a_tag() {
        let (mut session, a, _) = session();
        session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 0..5)))
            .unwrap();
        session.apply_format(InlineMark::Bold).unwrap();
        session.blur().unwrap();
        assert_eq!(content(&session, &a), "<b>Hello</b> world");

        // 1..3 starts inside the opening tag
        assert!(session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 1..3)))
            .unwrap());
        assert!(session.apply_format(InlineMark::Bold).is_none());
        assert!(session.toolbar().is_none());
        session.blur().unwrap();
        assert_eq!(content(&session, &a), "<b>Hello</b> world");
    }

    #[test]
    fn test_toolbar_requires_text_selection_on_current_page() {
        let (mut session, a, b) = session();
        assert!(!session.on_pointer_release(None).unwrap());
        assert!(!session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 3..3)))
            .unwrap());
        assert!(!session
            .on_pointer_release(Some(TextSelection::new(0, b, 0..2)))
            .unwrap());
        assert!(!session
            .on_pointer_release(Some(TextSelection::new(0, a.clone(), 0..50)))
            .unwrap());

        session.go_to_page(1).unwrap();
        assert!(!session
            .on_pointer_release(Some(TextSelection::new(0, a, 0..2)))
            .unwrap());
        assert!(session.toolbar().is_none());
    }

    #[test]
    fn test_pointer_down_dismisses_toolbar() {
        let (mut session, a, _) = session();
        session
            .on_pointer_release(Some(TextSelection::new(0, a, 0..5)))
            .unwrap();
        session.on_pointer_down();
        assert!(session.toolbar().is_none());
        assert!(session.apply_format(InlineMark::Underline).is_none());
    }

    #[test]
    fn test_buffer_edits_commit_on_focus_change() {
        let (mut session, a, _) = session();
        let c = session.insert_text(0, 2).unwrap();

        assert!(session.focus_block(0, &a).unwrap());
        assert!(session.update_buffer("Edited"));
        assert_eq!(content(&session, &a), "Hello world");

        session.focus_block(0, &c).unwrap();
        assert_eq!(content(&session, &a), "Edited");
        assert_eq!(session.focused().unwrap().block_id, c);
    }

    #[test]
    fn test_focus_on_media_block_is_refused() {
        let (mut session, _, b) = session();
        assert!(!session.focus_block(0, &b).unwrap());
        assert!(!session.update_buffer("nope"));
    }

    #[test]
    fn test_delete_focused_block_drops_edit() {
        let (mut session, a, b) = session();
        session.focus_block(0, &a).unwrap();
        session.update_buffer("lost");
        assert!(session.delete_block(0, &a).unwrap());
        assert!(session.focused().is_none());
        assert!(!session.blur().unwrap());
        assert!(!session.delete_block(0, &a).unwrap());
        assert_eq!(ids(&session, 0), vec![b]);
    }

    #[test]
    fn test_reorder() {
        let (mut session, a, b) = session();
        session.reorder(0, &[b.clone(), a.clone()]).unwrap();
        assert_eq!(ids(&session, 0), vec![b.clone(), a.clone()]);

        let err = session.reorder(0, &[b.clone(), b]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Document(DocumentError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn test_captions() {
        let (mut session, a, b) = session();
        assert!(session.set_caption(0, &b, Some("A cat".into())).unwrap());
        assert!(!session.set_caption(0, &a, Some("text".into())).unwrap());
        match session.document().find_block(0, &b) {
            Some(Block::Media(media)) => assert_eq!(media.caption.as_deref(), Some("A cat")),
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_pages() {
        let (mut session, _, _) = session();
        session.add_page(2).unwrap();
        assert_eq!(session.document().page_count(), 3);
        assert_eq!(session.go_to_page(10).unwrap(), 2);

        session.remove_page(2).unwrap();
        assert_eq!(session.current_page(), 1);
        session.remove_page(1).unwrap();
        session.remove_page(0).unwrap();
        assert_eq!(session.document().page_count(), 1);
        assert_eq!(session.current_page(), 0);
    }

    #[test]
    fn test_save_commits_and_clears_dirty() {
        let (mut session, a, _) = session();
        session.focus_block(0, &a).unwrap();
        session.update_buffer("Saved text");

        let mut sink = RecordingSink::default();
        session.save(&mut sink).unwrap();

        assert!(!session.is_dirty());
        assert_eq!(sink.drafts.len(), 1);
        assert_eq!(
            sink.drafts[0].find_block(0, &a).and_then(Block::as_text).unwrap().content,
            "Saved text"
        );
        assert!(!sink.drafts[0].is_published());
    }

    #[test]
    fn test_publish_sets_timestamp() {
        let (mut session, _, _) = session();
        let mut sink = RecordingSink::default();
        let before = Utc::now();
        session.publish(&mut sink).unwrap();

        assert_eq!(sink.published.len(), 1);
        match &sink.published[0].status {
            DocumentStatus::Published { at } => assert!(*at >= before),
            other => panic!("unexpected status {:?}", other),
        }
        let doc = session.into_document().unwrap();
        assert!(doc.is_published());
    }
}
