//! Quire Core Library
//!
//! This crate provides the core of Quire, a reader and editor for long-form
//! documents made of pages of text and media blocks.
//!
//! # Architecture
//!
//! - **Document model**: pages of tagged text/media blocks with stable ids
//! - **Editing sessions**: insertion menu, selection toolbar, reordering,
//!   save and publish
//! - **Reading sessions**: pagination, search, highlights, bookmarks and
//!   read-aloud, with per-item state kept in a [`ReadingStateStore`]
//!
//! # Quick Start
//!
//! ```text
//! let mut store = JsonStateStore::open(config.reading_state_path())?;
//! let content = ReadContent::from_text(&text);
//! let mut session = ReadingSession::open(item_id, content, &mut store,
//!     UnavailableSpeech, SessionOptions::from_config(&config, 100))?;
//!
//! session.go_to_page(3)?;
//! session.toggle_bookmark(3)?;
//! let results = session.run_search("whale");
//! ```
//!
//! # Modules
//!
//! - `models`: Blocks, pages, documents, reading state
//! - `document`: Document model operations
//! - `markup`: Inline marks and tag stripping
//! - `reader`: Reading sessions
//! - `editor`: Editing sessions and media ingestion
//! - `storage`: Reading state stores and document files
//! - `notice`: Transient notifications
//! - `config`: Application configuration

pub mod config;
pub mod document;
pub mod editor;
pub mod markup;
pub mod models;
pub mod notice;
pub mod reader;
pub mod storage;

pub use config::Config;
pub use document::DocumentError;
pub use editor::{EditingSession, EditorError};
pub use markup::InlineMark;
pub use models::{
    Block, BlockId, Document, DocumentStatus, Highlight, MediaKind, Page, ReadContent,
    ReadingState, SearchResult,
};
pub use notice::{Notice, NoticeLevel};
pub use reader::{ReaderError, ReadingSession, SessionOptions};
pub use storage::{
    DocumentFile, DocumentSink, DocumentStore, JsonStateStore, MemoryStateStore,
    ReadingStateStore, StorageError,
};
