//! Search command handler

use std::path::Path;

use anyhow::{bail, Result};

use quire_core::reader::{ActivePanel, UnavailableSpeech};
use quire_core::{Config, ReadingSession};

use super::{open_store, session_options};
use crate::content;
use crate::output::Output;

/// Search a file and optionally jump to one of the results
pub fn search(
    config: &Config,
    file: &Path,
    query: &str,
    open: Option<usize>,
    output: &Output,
) -> Result<()> {
    let source = content::open(file)?;
    let mut store = open_store(config)?;
    let mut session = ReadingSession::open(
        source.item_id,
        source.content,
        &mut store,
        UnavailableSpeech,
        session_options(config, None),
    )?;

    session.open_panel(ActivePanel::Search);
    let results = session.run_search(query).to_vec();

    match open {
        None => output.print_search_results(query, &results),
        Some(index) => {
            if !session.select_search_result(index)? {
                bail!(
                    "No search result [{}] ({} result(s) for \"{}\")",
                    index,
                    results.len(),
                    query
                );
            }
            output.success(&format!("Moved to page {}", session.current_page() + 1));
        }
    }

    session.close()?;
    Ok(())
}
