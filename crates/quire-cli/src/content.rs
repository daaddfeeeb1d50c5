//! Loading readable content from files
//!
//! A `.json` file is a saved [`Document`]; anything else is plain text
//! whose pages are separated by form feeds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quire_core::{Document, DocumentFile, ReadContent};

/// Content opened for reading
pub struct Source {
    /// Reading state key (canonical path)
    pub item_id: String,
    pub path: PathBuf,
    pub content: ReadContent,
}

/// Whether `path` holds a JSON document
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Open a file for reading
pub fn open(path: &Path) -> Result<Source> {
    let path = path
        .canonicalize()
        .with_context(|| format!("File not found: {:?}", path))?;

    let content = if is_document(&path) {
        ReadContent::from_document(&load_document(&path)?)
    } else {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        ReadContent::from_text(&text)
    };

    Ok(Source {
        item_id: path.to_string_lossy().into_owned(),
        path,
        content,
    })
}

/// Load a JSON document
pub fn load_document(path: &Path) -> Result<Document> {
    DocumentFile::new(path)
        .load()
        .with_context(|| format!("Failed to load document {:?}", path))
}
