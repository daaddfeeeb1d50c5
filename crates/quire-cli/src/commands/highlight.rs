//! Highlight command handlers

use std::path::Path;

use anyhow::{bail, Result};
use uuid::Uuid;

use quire_core::reader::{SelectionCapture, UnavailableSpeech};
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

/// Highlight `text` on a page (one-based), or on the current page
pub fn add(
    config: &Config,
    file: &Path,
    text: String,
    page: Option<usize>,
    output: &Output,
) -> Result<()> {
    let mut store = open_store(config)?;
    let mut session = open_session(config, file, &mut store)?;

    if let Some(page) = page {
        let index = page_index(page, session.total_pages())?;
        session.go_to_page(index as isize)?;
    }

    let current = session.current_page();
    let on_page = session
        .content()
        .page(current)
        .is_some_and(|content| content.contains(&text));
    if !on_page {
        bail!("\"{}\" does not appear on page {}", text, current + 1);
    }

    session.on_pointer_release(Some(SelectionCapture::new(text)));
    let Some(highlight) = session.add_highlight()? else {
        bail!("Nothing to highlight");
    };

    if output.is_quiet() {
        println!("{}", highlight.id);
    } else {
        output.success(&format!(
            "Highlighted on page {} ({})",
            highlight.page + 1,
            &highlight.id.to_string()[..8]
        ));
    }
    session.close()?;
    Ok(())
}

/// Remove a highlight by id (full UUID or prefix)
pub fn remove(config: &Config, file: &Path, id: &str, output: &Output) -> Result<()> {
    let mut store = open_store(config)?;
    let mut session = open_session(config, file, &mut store)?;

    let id = resolve_id(session.highlights().iter().map(|h| h.id), id)?;
    session.remove_highlight(id)?;
    output.success(&format!("Removed highlight {}", &id.to_string()[..8]));
    session.close()?;
    Ok(())
}

/// List highlights, optionally only those on one page (one-based)
pub fn list(config: &Config, file: &Path, page: Option<usize>, output: &Output) -> Result<()> {
    let mut store = open_store(config)?;
    let session = open_session(config, file, &mut store)?;

    let highlights: Vec<_> = match page {
        Some(page) => session
            .highlights_on_page(page_index(page, session.total_pages())?)
            .into_iter()
            .cloned()
            .collect(),
        None => session.highlights().to_vec(),
    };
    output.print_highlights(&highlights);
    Ok(())
}

/// Find the single id matching a full UUID or a unique prefix
fn resolve_id(ids: impl Iterator<Item = Uuid>, query: &str) -> Result<Uuid> {
    let query = query.trim().to_lowercase();
    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(&query))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No highlight found with ID '{}'", query),
        _ => bail!("Ambiguous ID '{}' matches {} highlights", query, matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_id() {
        let a = Uuid::parse_str("aaaaaaaa-0000-4000-8000-000000000001").unwrap();
        let b = Uuid::parse_str("aaaabbbb-0000-4000-8000-000000000002").unwrap();
        let ids = || [a, b].into_iter();

        assert_eq!(resolve_id(ids(), "AAAAAAAA").unwrap(), a);
        assert_eq!(resolve_id(ids(), &b.to_string()).unwrap(), b);
        assert!(resolve_id(ids(), "aaaa").is_err());
        assert!(resolve_id(ids(), "ffff").is_err());
    }
}
