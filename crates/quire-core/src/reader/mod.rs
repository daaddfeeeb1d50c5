//! Reading sessions
//!
//! A [`ReadingSession`] presents read-only page content and keeps the
//! item's [`ReadingState`] in the store up to date as the reader navigates,
//! bookmarks and highlights.
//!
//! ## State
//!
//! - current page (persisted)
//! - read-aloud: `idle | playing | paused`, reset on every page change
//! - selection popup: present after a non-empty selection is released
//! - active panel: `none | table of contents | search | notes | settings`
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = MemoryStateStore::new();
//! let content = ReadContent::new(vec!["Page one".into(), "Page two".into()]);
//! let mut session = ReadingSession::open("book", content, &mut store,
//!     UnavailableSpeech, SessionOptions::default())?;
//! session.go_to_page(1)?;
//! session.toggle_bookmark(1)?;
//! ```

pub mod highlight;
pub mod pagination;
pub mod search;
pub mod tts;

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::markup;
use crate::models::{Highlight, ReadContent, ReadingState, ReadingStatePatch, SearchResult, SelectionRect};
use crate::notice::{Notice, Notices};
use crate::storage::{ReadingStateStore, StorageError};

pub use highlight::{render_highlights, MARK_CLOSE, MARK_OPEN};
pub use pagination::{clamp_page, reading_progress};
pub use search::search_pages;
pub use tts::{ReadAloud, SpeechEngine, SpeechError, SpeechHandle, TtsState, UnavailableSpeech};

/// Errors surfaced by a reading session
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("Failed to persist reading state: {0}")]
    Storage(#[from] StorageError),
}

/// Side panel currently shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePanel {
    #[default]
    None,
    TableOfContents,
    Search,
    Notes,
    Settings,
}

/// Text selection captured on pointer release
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCapture {
    pub text: String,
    pub rect: SelectionRect,
}

impl SelectionCapture {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rect: SelectionRect::default(),
        }
    }
}

/// Layout and search tuning for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Current viewport width in columns
    pub viewport_width: u16,
    pub dual_page_min_width: u16,
    pub snippet_context: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            viewport_width: 80,
            dual_page_min_width: 120,
            snippet_context: 30,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Config, viewport_width: u16) -> Self {
        Self {
            viewport_width,
            dual_page_min_width: config.dual_page_min_width,
            snippet_context: config.snippet_context,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchOutcome {
    query: String,
    results: Vec<SearchResult>,
}

/// Reading session over one content item
///
/// Borrows the reading state store for the lifetime of the session and
/// writes every change through to it.
pub struct ReadingSession<'a, E: SpeechEngine> {
    item_id: String,
    content: ReadContent,
    store: &'a mut dyn ReadingStateStore,
    state: ReadingState,
    speech: E,
    read_aloud: ReadAloud,
    options: SessionOptions,
    selection: Option<SelectionCapture>,
    panel: ActivePanel,
    search: Option<SearchOutcome>,
    notices: Notices,
}

impl<'a, E: SpeechEngine> ReadingSession<'a, E> {
    /// Open a session, creating the item's reading state if needed
    ///
    /// A stored page beyond the end of the content is clamped.
    pub fn open(
        item_id: impl Into<String>,
        content: ReadContent,
        store: &'a mut dyn ReadingStateStore,
        speech: E,
        options: SessionOptions,
    ) -> Result<Self, ReaderError> {
        let item_id = item_id.into();
        let state = match store.get(&item_id)? {
            Some(state) => state,
            None => {
                store.merge(&item_id, ReadingStatePatch::default())?;
                ReadingState::default()
            }
        };

        let mut session = Self {
            item_id,
            content,
            store,
            state,
            speech,
            read_aloud: ReadAloud::new(),
            options,
            selection: None,
            panel: ActivePanel::None,
            search: None,
            notices: Notices::default(),
        };

        let total = session.total_pages();
        let stored = session.state.current_page;
        let clamped = stored.min(total.saturating_sub(1));
        if clamped != stored {
            session.persist(ReadingStatePatch::current_page(clamped))?;
            session.state.current_page = clamped;
        }

        debug!(
            "Opened reading session for {} at page {}/{}",
            session.item_id, clamped, total
        );
        Ok(session)
    }

    /// Write `patch` through to the store
    ///
    /// Callers update `self.state` only after this succeeds, so a failed
    /// write leaves the session in step with the store.
    fn persist(&mut self, patch: ReadingStatePatch) -> Result<(), ReaderError> {
        self.store.merge(&self.item_id, patch)?;
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content(&self) -> &ReadContent {
        &self.content
    }

    pub fn state(&self) -> &ReadingState {
        &self.state
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.content.page_count()
    }

    pub fn tts_state(&self) -> TtsState {
        self.read_aloud.state()
    }

    pub fn panel(&self) -> ActivePanel {
        self.panel
    }

    pub fn selection(&self) -> Option<&SelectionCapture> {
        self.selection.as_ref()
    }

    pub fn speech(&self) -> &E {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut E {
        &mut self.speech
    }

    /// Take pending notifications for display
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    // ==================== Layout ====================

    pub fn set_viewport_width(&mut self, width: u16) {
        self.options.viewport_width = width;
    }

    pub fn is_dual_page(&self) -> bool {
        pagination::is_dual_page(self.options.viewport_width, self.options.dual_page_min_width)
    }

    /// Pages moved by next/previous navigation
    pub fn page_increment(&self) -> usize {
        pagination::page_increment(self.is_dual_page())
    }

    /// Pages currently on screen
    pub fn visible_pages(&self) -> Vec<usize> {
        pagination::visible_pages(self.current_page(), self.total_pages(), self.is_dual_page())
    }

    /// Percentage of words read through the current page
    pub fn progress(&self) -> u8 {
        reading_progress(&self.content.pages, self.current_page())
    }

    // ==================== Navigation ====================

    /// Navigate to page `n`, clamped into the content
    ///
    /// Always cancels read-aloud and clears the selection popup.
    pub fn go_to_page(&mut self, n: isize) -> Result<usize, ReaderError> {
        let target = clamp_page(n, self.total_pages());

        self.read_aloud.cancel(&mut self.speech);
        self.selection = None;

        if target != self.state.current_page {
            self.persist(ReadingStatePatch::current_page(target))?;
            self.state.current_page = target;
            debug!("Moved to page {}", target);
        }
        Ok(target)
    }

    pub fn next_page(&mut self) -> Result<usize, ReaderError> {
        let n = self.current_page().saturating_add(self.page_increment());
        self.go_to_page(n.min(isize::MAX as usize) as isize)
    }

    pub fn previous_page(&mut self) -> Result<usize, ReaderError> {
        let n = self.current_page() as isize - self.page_increment() as isize;
        self.go_to_page(n)
    }

    /// Jump to a table of contents entry and close the panel
    ///
    /// Returns false for an unknown entry.
    pub fn go_to_toc_entry(&mut self, index: usize) -> Result<bool, ReaderError> {
        let Some(target) = self.content.toc.get(index).map(|e| e.target_page) else {
            return Ok(false);
        };
        self.go_to_page(target.min(isize::MAX as usize) as isize)?;
        if self.panel == ActivePanel::TableOfContents {
            self.panel = ActivePanel::None;
        }
        Ok(true)
    }

    // ==================== Panels ====================

    pub fn open_panel(&mut self, panel: ActivePanel) {
        self.panel = panel;
    }

    pub fn close_panel(&mut self) {
        self.panel = ActivePanel::None;
    }

    pub fn toggle_panel(&mut self, panel: ActivePanel) {
        self.panel = if self.panel == panel {
            ActivePanel::None
        } else {
            panel
        };
    }

    // ==================== Bookmarks ====================

    pub fn bookmarks(&self) -> &BTreeSet<usize> {
        &self.state.bookmarks
    }

    pub fn is_bookmarked(&self, page: usize) -> bool {
        self.state.is_bookmarked(page)
    }

    /// Add or remove a bookmark; returns whether the page is now bookmarked
    pub fn toggle_bookmark(&mut self, page: usize) -> Result<bool, ReaderError> {
        let mut next = self.state.clone();
        let now_set = next.toggle_bookmark(page);
        self.persist(ReadingStatePatch::bookmarks(next.bookmarks.clone()))?;
        self.state = next;
        Ok(now_set)
    }

    /// Remove a bookmark; returns whether it existed
    pub fn remove_bookmark(&mut self, page: usize) -> Result<bool, ReaderError> {
        let mut next = self.state.clone();
        if !next.remove_bookmark(page) {
            return Ok(false);
        }
        self.persist(ReadingStatePatch::bookmarks(next.bookmarks.clone()))?;
        self.state = next;
        Ok(true)
    }

    // ==================== Search ====================

    /// Search all pages; one result per page with a match
    pub fn run_search(&mut self, query: &str) -> &[SearchResult] {
        let results = search_pages(&self.content.pages, query, self.options.snippet_context);
        debug!("Search {:?} matched {} pages", query, results.len());
        let outcome = self.search.insert(SearchOutcome {
            query: query.to_string(),
            results,
        });
        &outcome.results
    }

    pub fn search_results(&self) -> &[SearchResult] {
        self.search
            .as_ref()
            .map(|s| s.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.query.as_str())
    }

    /// Navigate to a search result and close the search panel
    ///
    /// Returns false for an unknown result index.
    pub fn select_search_result(&mut self, index: usize) -> Result<bool, ReaderError> {
        let Some(page) = self.search_results().get(index).map(|r| r.page) else {
            return Ok(false);
        };
        self.go_to_page(page.min(isize::MAX as usize) as isize)?;
        if self.panel == ActivePanel::Search {
            self.panel = ActivePanel::None;
        }
        Ok(true)
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    // ==================== Selection & highlights ====================

    /// Pointer released over the content surface
    ///
    /// A non-blank selection shows the popup; anything else hides it.
    pub fn on_pointer_release(&mut self, capture: Option<SelectionCapture>) {
        self.selection = capture.filter(|c| !c.text.trim().is_empty());
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.state.highlights
    }

    pub fn highlights_on_page(&self, page: usize) -> Vec<&Highlight> {
        self.state
            .highlights
            .iter()
            .filter(|h| h.page == page)
            .collect()
    }

    /// Highlight the captured selection on the current page
    ///
    /// Returns `None` when no selection popup is active.
    pub fn add_highlight(&mut self) -> Result<Option<Highlight>, ReaderError> {
        let Some(selection) = self.selection.as_ref() else {
            return Ok(None);
        };

        let highlight = Highlight::new(self.current_page(), selection.text.clone());
        let mut highlights = self.state.highlights.clone();
        highlights.push(highlight.clone());
        self.persist(ReadingStatePatch::highlights(highlights.clone()))?;
        self.state.highlights = highlights;
        self.selection = None;
        debug!("Added highlight {} on page {}", highlight.id, highlight.page);
        Ok(Some(highlight))
    }

    /// Remove a highlight; unknown ids are ignored
    pub fn remove_highlight(&mut self, id: Uuid) -> Result<bool, ReaderError> {
        if !self.state.highlights.iter().any(|h| h.id == id) {
            return Ok(false);
        }
        let mut highlights = self.state.highlights.clone();
        highlights.retain(|h| h.id != id);
        self.persist(ReadingStatePatch::highlights(highlights.clone()))?;
        self.state.highlights = highlights;
        Ok(true)
    }

    /// Page content with highlight markers applied
    pub fn render_page(&self, page: usize) -> Option<String> {
        let content = self.content.page(page)?;
        let highlights = self.highlights_on_page(page);
        Some(render_highlights(content, highlights.iter().map(|h| h.text.as_str())).into_owned())
    }

    /// Rendered content of every visible page
    pub fn render_visible(&self) -> Vec<(usize, String)> {
        self.visible_pages()
            .into_iter()
            .filter_map(|page| self.render_page(page).map(|text| (page, text)))
            .collect()
    }

    // ==================== Read-aloud ====================

    /// Read the current page aloud (resumes when paused)
    pub fn play(&mut self) -> Result<TtsState, ReaderError> {
        let text = self
            .content
            .page(self.current_page())
            .map(markup::strip_tags)
            .unwrap_or_default();

        if text.trim().is_empty() && self.read_aloud.state() == TtsState::Idle {
            self.notices.push(Notice::info("Nothing to read on this page"));
            return Ok(TtsState::Idle);
        }

        let result = self.read_aloud.play(&mut self.speech, &text);
        self.report(result)
    }

    pub fn pause(&mut self) -> Result<TtsState, ReaderError> {
        let result = self.read_aloud.pause(&mut self.speech);
        self.report(result)
    }

    pub fn resume(&mut self) -> Result<TtsState, ReaderError> {
        let result = self.read_aloud.resume(&mut self.speech);
        self.report(result)
    }

    /// Stop read-aloud and return to idle
    pub fn stop(&mut self) {
        self.read_aloud.cancel(&mut self.speech);
    }

    /// Speech engine finished the utterance with `handle`
    pub fn on_speech_end(&mut self, handle: SpeechHandle) -> bool {
        self.read_aloud.on_end(handle)
    }

    /// Handle of the utterance in flight
    pub fn speech_handle(&self) -> Option<SpeechHandle> {
        self.read_aloud.handle()
    }

    fn report(&mut self, result: Result<TtsState, SpeechError>) -> Result<TtsState, ReaderError> {
        result.map_err(|e| {
            self.notices.push(Notice::error(e.to_string()));
            ReaderError::from(e)
        })
    }

    // ==================== Lifecycle ====================

    /// Close the session, cancelling read-aloud and persisting the page
    pub fn close(mut self) -> Result<ReadingState, ReaderError> {
        self.read_aloud.cancel(&mut self.speech);
        self.persist(ReadingStatePatch::current_page(self.state.current_page))?;
        debug!("Closed reading session for {}", self.item_id);
        Ok(self.state.clone())
    }
}

impl<E: SpeechEngine> Drop for ReadingSession<'_, E> {
    fn drop(&mut self) {
        self.read_aloud.cancel(&mut self.speech);
    }
}
