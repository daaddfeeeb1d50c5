//! Document persistence
//!
//! Editing sessions hand documents back to the host through a
//! [`DocumentSink`] when the user saves a draft or publishes.
//!
//! - [`DocumentFile`]: a single JSON file, rewritten on every save
//! - [`DocumentStore`]: a directory with `drafts/` and `published/` copies,
//!   one `{id}.json` per document

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::files::{read_json, write_json};
use crate::models::Document;

/// Receives documents on save and publish
pub trait DocumentSink {
    /// Persist the document as a draft
    fn save_draft(&mut self, doc: &Document) -> StorageResult<()>;

    /// Persist a document that has just been marked published
    fn publish(&mut self, doc: &Document) -> StorageResult<()>;
}

/// A document kept in one JSON file
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, failing if the file does not exist
    pub fn load(&self) -> StorageResult<Document> {
        read_json(&self.path)?.ok_or_else(|| StorageError::NotFound {
            path: self.path.clone(),
        })
    }

    pub fn write(&self, doc: &Document) -> StorageResult<()> {
        write_json(&self.path, doc)
    }
}

impl DocumentSink for DocumentFile {
    fn save_draft(&mut self, doc: &Document) -> StorageResult<()> {
        self.write(doc)?;
        info!("Saved draft {} to {:?}", doc.id, self.path);
        Ok(())
    }

    fn publish(&mut self, doc: &Document) -> StorageResult<()> {
        self.write(doc)?;
        info!("Published {} to {:?}", doc.id, self.path);
        Ok(())
    }
}

/// Directory of drafts and published documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn draft_path(&self, id: Uuid) -> PathBuf {
        self.dir.join("drafts").join(format!("{}.json", id))
    }

    pub fn published_path(&self, id: Uuid) -> PathBuf {
        self.dir.join("published").join(format!("{}.json", id))
    }

    /// Load the latest draft of a document
    pub fn load_draft(&self, id: Uuid) -> StorageResult<Option<Document>> {
        read_json(&self.draft_path(id))
    }

    /// Load the published copy of a document
    pub fn load_published(&self, id: Uuid) -> StorageResult<Option<Document>> {
        read_json(&self.published_path(id))
    }
}

impl DocumentSink for DocumentStore {
    fn save_draft(&mut self, doc: &Document) -> StorageResult<()> {
        let path = self.draft_path(doc.id);
        write_json(&path, doc)?;
        info!("Saved draft {} to {:?}", doc.id, path);
        Ok(())
    }

    fn publish(&mut self, doc: &Document) -> StorageResult<()> {
        // The draft tracks the published state too
        write_json(&self.draft_path(doc.id), doc)?;
        let path = self.published_path(doc.id);
        write_json(&path, doc)?;
        info!("Published {} to {:?}", doc.id, path);
        Ok(())
    }
}
