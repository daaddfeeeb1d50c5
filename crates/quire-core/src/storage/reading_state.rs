//! Reading state persistence
//!
//! Maps an item identifier to its [`ReadingState`]. Every write is a shallow
//! merge of a [`ReadingStatePatch`] into the stored record, creating the
//! record with defaults when it does not exist yet. Writers touching
//! different items never conflict.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::StorageResult;
use super::files::{read_json, write_json};
use crate::models::{ReadingState, ReadingStatePatch};

/// Key-value store of reading states
pub trait ReadingStateStore {
    /// Get the state for an item, if one was ever written
    fn get(&self, item_id: &str) -> StorageResult<Option<ReadingState>>;

    /// Shallow-merge `patch` into the item's record, creating it if absent
    fn merge(&mut self, item_id: &str, patch: ReadingStatePatch) -> StorageResult<()>;
}

/// In-memory store (nothing is persisted)
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    items: BTreeMap<String, ReadingState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ReadingStateStore for MemoryStateStore {
    fn get(&self, item_id: &str) -> StorageResult<Option<ReadingState>> {
        Ok(self.items.get(item_id).cloned())
    }

    fn merge(&mut self, item_id: &str, patch: ReadingStatePatch) -> StorageResult<()> {
        self.items
            .entry(item_id.to_string())
            .or_default()
            .apply(patch);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    items: BTreeMap<String, ReadingState>,
}

/// Store backed by a single JSON file, rewritten atomically on each merge
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
    file: StateFile,
}

impl JsonStateStore {
    /// Open the store at `path`, loading existing records if the file exists
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let file = read_json(&path)?.unwrap_or_default();
        debug!("Opened reading state store at {:?}", path);
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Item ids with a stored record
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.file.items.keys().map(String::as_str)
    }
}

impl ReadingStateStore for JsonStateStore {
    fn get(&self, item_id: &str) -> StorageResult<Option<ReadingState>> {
        Ok(self.file.items.get(item_id).cloned())
    }

    fn merge(&mut self, item_id: &str, patch: ReadingStatePatch) -> StorageResult<()> {
        if patch.is_empty() && self.file.items.contains_key(item_id) {
            return Ok(());
        }

        let mut record = self.file.items.get(item_id).cloned().unwrap_or_default();
        record.apply(patch);
        let previous = self.file.items.insert(item_id.to_string(), record);

        if let Err(e) = write_json(&self.path, &self.file) {
            match previous {
                Some(previous) => self.file.items.insert(item_id.to_string(), previous),
                None => self.file.items.remove(item_id),
            };
            return Err(e);
        }
        debug!("Merged reading state for {}", item_id);
        Ok(())
    }
}
