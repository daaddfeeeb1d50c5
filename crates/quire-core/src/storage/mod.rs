//! Storage layer
//!
//! Handles persistence of reading states and documents.
//!
//! ## Architecture
//!
//! - **Reading states**: one record per item id behind the
//!   [`ReadingStateStore`] trait, merged shallowly on every write
//! - **Documents**: handed back by editing sessions through a
//!   [`DocumentSink`]
//!
//! File-backed implementations write JSON atomically (temp file + rename).

pub mod documents;
pub mod error;
mod files;
pub mod reading_state;

pub use documents::{DocumentFile, DocumentSink, DocumentStore};
pub use error::{StorageError, StorageResult};
pub use reading_state::{JsonStateStore, MemoryStateStore, ReadingStateStore};
