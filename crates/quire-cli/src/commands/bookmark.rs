//! Bookmark command handlers

use std::path::Path;

use anyhow::Result;

use quire_core::reader::UnavailableSpeech;
use quire_core::{Config, JsonStateStore, ReadingSession};

use super::{open_store, page_index, session_options};
use crate::content;
use crate::output::Output;

fn open_session<'a>(
    config: &Config,
    file: &Path,
    store: &'a mut JsonStateStore,
) -> Result<ReadingSession<'a, UnavailableSpeech>> {
    let source = content::open(file)?;
    Ok(ReadingSession::open(
        source.item_id,
        source.content,
        store,
        UnavailableSpeech,
        session_options(config, None),
    )?)
}

/// Toggle a bookmark on a page (one-based), or on the current page
pub fn toggle(config: &Config, file: &Path, page: Option<usize>, output: &Output) -> Result<()> {
    let mut store = open_store(config)?;
    let mut session = open_session(config, file, &mut store)?;

    let index = match page {
        Some(page) => page_index(page, session.total_pages())?,
        None => session.current_page(),
    };

    if session.toggle_bookmark(index)? {
        output.success(&format!("Bookmarked page {}", index + 1));
    } else {
        output.success(&format!("Removed bookmark on page {}", index + 1));
    }
    session.close()?;
    Ok(())
}

/// Remove a bookmark (one-based page)
pub fn remove(config: &Config, file: &Path, page: usize, output: &Output) -> Result<()> {
    let mut store = open_store(config)?;
    let mut session = open_session(config, file, &mut store)?;

    let index = page.saturating_sub(1);
    if page > 0 && session.remove_bookmark(index)? {
        output.success(&format!("Removed bookmark on page {}", page));
    } else {
        output.message(&format!("Page {} is not bookmarked", page));
    }
    session.close()?;
    Ok(())
}

/// List bookmarked pages
pub fn list(config: &Config, file: &Path, output: &Output) -> Result<()> {
    let mut store = open_store(config)?;
    let session = open_session(config, file, &mut store)?;

    let pages: Vec<usize> = session.bookmarks().iter().copied().collect();
    output.print_bookmarks(&pages);
    Ok(())
}
