//! Read command handler

use std::path::Path;

use anyhow::Result;

use quire_core::reader::UnavailableSpeech;
use quire_core::{Config, ReadingSession};

use super::{open_store, page_index, session_options};
use crate::content;
use crate::output::Output;

/// Where to move before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    /// One-based page number
    Page(usize),
    Next,
    Previous,
}

/// Render the visible page(s) of a file, moving first if asked
pub fn read(
    config: &Config,
    file: &Path,
    navigation: Navigation,
    width: Option<u16>,
    output: &Output,
) -> Result<()> {
    let source = content::open(file)?;
    let mut store = open_store(config)?;
    let mut session = ReadingSession::open(
        source.item_id,
        source.content,
        &mut store,
        UnavailableSpeech,
        session_options(config, width),
    )?;

    match navigation {
        Navigation::Stay => {}
        Navigation::Page(page) => {
            let index = page_index(page, session.total_pages())?;
            session.go_to_page(index as isize)?;
        }
        Navigation::Next => {
            session.next_page()?;
        }
        Navigation::Previous => {
            session.previous_page()?;
        }
    }

    output.print_pages(
        &session.render_visible(),
        session.total_pages(),
        session.progress(),
    );
    session.close()?;
    Ok(())
}
