//! Status command handler

use std::path::Path;

use anyhow::Result;

use quire_core::reader::UnavailableSpeech;
use quire_core::{Config, ReadingSession};

use super::{open_store, session_options};
use crate::content;
use crate::output::{Output, OutputFormat};

/// Show reading position and saved annotations for a file
pub fn show(config: &Config, file: &Path, output: &Output) -> Result<()> {
    let source = content::open(file)?;
    let author = source.content.author.clone();
    let mut store = open_store(config)?;
    let session = ReadingSession::open(
        source.item_id,
        source.content,
        &mut store,
        UnavailableSpeech,
        session_options(config, None),
    )?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "item_id": session.item_id(),
                    "author": author,
                    "current_page": session.current_page(),
                    "total_pages": session.total_pages(),
                    "progress": session.progress(),
                    "dual_page": session.is_dual_page(),
                    "bookmarks": session.bookmarks(),
                    "highlights": session.highlights().len(),
                    "toc_entries": session.content().toc.len()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", session.current_page());
        }
        OutputFormat::Human => {
            println!("{}", source.path.display());
            if let Some(author) = author {
                println!("  Author:     {}", author);
            }
            println!(
                "  Page:       {} of {}",
                session.current_page() + 1,
                session.total_pages()
            );
            println!("  Progress:   {}%", session.progress());
            println!(
                "  Layout:     {}",
                if session.is_dual_page() { "dual page" } else { "single page" }
            );
            println!("  Bookmarks:  {}", session.bookmarks().len());
            println!("  Highlights: {}", session.highlights().len());
            if !session.content().toc.is_empty() {
                println!();
                println!("Contents:");
                for entry in &session.content().toc {
                    println!("  {:<40} p. {}", entry.title, entry.target_page + 1);
                }
            }
        }
    }

    Ok(())
}
