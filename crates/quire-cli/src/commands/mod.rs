//! Command handlers

pub mod bookmark;
pub mod config;
pub mod doc;
pub mod highlight;
pub mod read;
pub mod search;
pub mod speak;
pub mod status;

use anyhow::{Context, Result};

use quire_core::{Config, JsonStateStore, SessionOptions};

/// Columns assumed when the terminal width is unknown
const DEFAULT_WIDTH: u16 = 80;

/// Open the reading state file from the data directory
pub fn open_store(config: &Config) -> Result<JsonStateStore> {
    let path = config.reading_state_path();
    JsonStateStore::open(&path).with_context(|| format!("Failed to open reading state {:?}", path))
}

/// Session options for a viewport of `width` columns (or `$COLUMNS`)
pub fn session_options(config: &Config, width: Option<u16>) -> SessionOptions {
    let width = width
        .or_else(|| std::env::var("COLUMNS").ok()?.trim().parse().ok())
        .unwrap_or(DEFAULT_WIDTH);
    SessionOptions::from_config(config, width)
}

/// Convert a one-based page number from the command line
pub fn page_index(page: usize, total: usize) -> Result<usize> {
    if page == 0 || page > total {
        anyhow::bail!("Page {} does not exist (1-{})", page, total);
    }
    Ok(page - 1)
}
