//! Speak command handler

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use quire_core::reader::TtsState;
use quire_core::{Config, ReadingSession};

use super::{open_store, page_index, session_options};
use crate::content;
use crate::output::Output;
use crate::speech::ProcessSpeech;

/// Read a page aloud with the configured speech command
///
/// Runs until the command finishes or Ctrl-C is pressed.
pub async fn speak(config: &Config, file: &Path, page: Option<usize>, output: &Output) -> Result<()> {
    let source = content::open(file)?;
    let mut store = open_store(config)?;
    let mut session = ReadingSession::open(
        source.item_id,
        source.content,
        &mut store,
        ProcessSpeech::new(config.speech_command.clone()),
        session_options(config, None),
    )?;

    if let Some(page) = page {
        let index = page_index(page, session.total_pages())?;
        session.go_to_page(index as isize)?;
    }

    let played = session.play();
    output.print_notices(&session.take_notices());
    if played? != TtsState::Playing {
        return Ok(());
    }
    output.message(&format!(
        "Reading page {} aloud (Ctrl-C to stop)",
        session.current_page() + 1
    ));

    let finished = tokio::select! {
        handle = session.speech_mut().wait() => handle,
        _ = tokio::signal::ctrl_c() => None,
    };

    match finished {
        Some(handle) => {
            session.on_speech_end(handle);
            debug!("Finished reading page {}", session.current_page());
        }
        None => session.stop(),
    }

    session.close()?;
    Ok(())
}
