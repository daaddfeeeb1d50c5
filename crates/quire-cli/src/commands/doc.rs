//! Document authoring command handlers
//!
//! Each command loads the document file, applies one edit through an
//! editing session and writes the file back. Page and block positions are
//! zero-based.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use quire_core::editor::{BlockKind, FileIngest, TextSelection};
use quire_core::storage::StorageResult;
use quire_core::{
    BlockId, Config, Document, DocumentFile, DocumentSink, DocumentStore, EditingSession,
    InlineMark,
};

use crate::content::load_document;
use crate::input::text_or_stdin;
use crate::output::Output;

/// Content of a new block
#[derive(Debug, Default)]
pub struct NewBlock {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub caption: Option<String>,
}

/// Writes the document file and keeps a copy in the document library
struct Library {
    file: DocumentFile,
    store: DocumentStore,
}

impl DocumentSink for Library {
    fn save_draft(&mut self, doc: &Document) -> StorageResult<()> {
        self.file.save_draft(doc)?;
        self.store.save_draft(doc)
    }

    fn publish(&mut self, doc: &Document) -> StorageResult<()> {
        self.file.publish(doc)?;
        self.store.publish(doc)
    }
}

fn open(file: &Path) -> Result<EditingSession> {
    Ok(EditingSession::new(load_document(file)?))
}

/// Commit and write the session back to its file
fn write_back(mut session: EditingSession, file: &Path, output: &Output) -> Result<()> {
    session
        .save(&mut DocumentFile::new(file))
        .with_context(|| format!("Failed to write {:?}", file))?;
    output.print_notices(&session.take_notices());
    Ok(())
}

/// Create a new document with one empty page
pub fn new(file: &Path, title: String, author: Option<String>, output: &Output) -> Result<()> {
    if file.exists() {
        bail!("{:?} already exists", file);
    }
    let mut doc = Document::new(title);
    doc.author = author;
    DocumentFile::new(file)
        .save_draft(&doc)
        .with_context(|| format!("Failed to write {:?}", file))?;

    if output.is_quiet() {
        println!("{}", doc.id);
    } else {
        output.success(&format!("Created \"{}\" at {}", doc.title, file.display()));
    }
    Ok(())
}

pub fn show(file: &Path, output: &Output) -> Result<()> {
    output.print_document(&load_document(file)?);
    Ok(())
}

/// Insert an empty page (appended when no index is given)
pub fn add_page(file: &Path, index: Option<usize>, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    let index = index.unwrap_or(session.document().page_count());
    session.add_page(index)?;
    write_back(session, file, output)?;
    output.success(&format!("Added page {}", index));
    Ok(())
}

/// Remove a page
pub fn remove_page(file: &Path, index: usize, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    session.remove_page(index)?;
    write_back(session, file, output)?;
    output.success(&format!("Removed page {}", index));
    Ok(())
}

/// Insert a block of the given kind
///
/// Media comes from `--file` (embedded as a data URI) or `--url`; with
/// neither, nothing is inserted.
pub async fn add(
    file: &Path,
    page: usize,
    index: usize,
    kind: BlockKind,
    block: NewBlock,
    output: &Output,
) -> Result<()> {
    let mut session = open(file)?;
    session.go_to_page(page)?;

    let inserted = match kind.media_kind() {
        None => {
            let id = session.insert_text(page, index)?;
            if let Some(text) = block.text {
                session.focus_block(page, &id)?;
                session.update_buffer(text);
            }
            Some(id)
        }
        Some(media) => match &block.file {
            Some(path) => {
                let inserted = session
                    .insert_local_media(&FileIngest, page, index, media, path)
                    .await;
                output.print_notices(&session.take_notices());
                inserted?
            }
            None => session.insert_remote_media(page, index, media, block.url.as_deref())?,
        },
    };

    let Some(id) = inserted else {
        output.message("No block inserted");
        return Ok(());
    };

    if let Some(caption) = block.caption {
        session.set_caption(page, &id, Some(caption))?;
    }

    write_back(session, file, output)?;
    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Added block {}", id));
    }
    Ok(())
}

/// Replace a text block's content (from the argument or stdin)
pub fn edit(
    file: &Path,
    page: usize,
    block: String,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = open(file)?;
    let id = BlockId::from(block);
    if !session.focus_block(page, &id)? {
        bail!("No text block {} on page {}", id, page);
    }
    session.update_buffer(text_or_stdin(text)?);
    write_back(session, file, output)?;
    output.success(&format!("Updated block {}", id));
    Ok(())
}

/// Toggle an inline mark over a byte range of a text block
pub fn format(
    file: &Path,
    page: usize,
    block: String,
    start: usize,
    end: usize,
    mark: InlineMark,
    output: &Output,
) -> Result<()> {
    let mut session = open(file)?;
    session.go_to_page(page)?;

    let id = BlockId::from(block);
    let selection = TextSelection::new(page, id.clone(), start..end);
    if !session.on_pointer_release(Some(selection))? {
        bail!("Cannot select {}..{} in text block {} on page {}", start, end, id, page);
    }
    let Some(toggled) = session.apply_format(mark) else {
        bail!("Selection {}..{} splits a tag", start, end);
    };

    write_back(session, file, output)?;
    output.success(&format!(
        "{} {:?} on {}..{}",
        if toggled.applied { "Applied" } else { "Removed" },
        mark,
        toggled.selection.start,
        toggled.selection.end
    ));
    Ok(())
}

/// Set or clear a media block's caption
pub fn caption(
    file: &Path,
    page: usize,
    block: String,
    caption: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = open(file)?;
    let id = BlockId::from(block);
    if !session.set_caption(page, &id, caption)? {
        bail!("No media block {} on page {}", id, page);
    }
    write_back(session, file, output)?;
    output.success(&format!("Updated caption of {}", id));
    Ok(())
}

/// Delete a block; deleting a missing block is not an error
pub fn delete(file: &Path, page: usize, block: String, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    let id = BlockId::from(block);
    if session.delete_block(page, &id)? {
        write_back(session, file, output)?;
        output.success(&format!("Deleted block {}", id));
    } else {
        output.message(&format!("No block {} on page {}", id, page));
    }
    Ok(())
}

/// Reorder a page's blocks
pub fn reorder(file: &Path, page: usize, ids: Vec<String>, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    let order: Vec<BlockId> = ids.into_iter().map(BlockId::from).collect();
    session.reorder(page, &order)?;
    write_back(session, file, output)?;
    output.success(&format!("Reordered page {}", page));
    Ok(())
}

/// Save the document and keep a draft copy in the library
pub fn save(config: &Config, file: &Path, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    let mut library = library(config, file);
    session.save(&mut library)?;
    output.success(&format!(
        "Saved draft to {}",
        library.store.draft_path(session.document().id).display()
    ));
    Ok(())
}

/// Mark the document published and copy it into the library
pub fn publish(config: &Config, file: &Path, output: &Output) -> Result<()> {
    let mut session = open(file)?;
    let mut library = library(config, file);
    session.publish(&mut library)?;
    output.success(&format!(
        "Published to {}",
        library.store.published_path(session.document().id).display()
    ));
    Ok(())
}

fn library(config: &Config, file: &Path) -> Library {
    Library {
        file: DocumentFile::new(file),
        store: DocumentStore::new(config.documents_dir()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use quire_core::{Block, DocumentStatus};
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn first_block(file: &Path) -> Block {
        load_document(file).unwrap().pages[0].blocks[0].clone()
    }

    #[tokio::test]
    async fn test_new_add_and_format() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.json");

        new(&file, "Essay".to_string(), None, &quiet()).unwrap();
        assert!(new(&file, "Again".to_string(), None, &quiet()).is_err());

        let block = NewBlock {
            text: Some("Hello world".to_string()),
            ..NewBlock::default()
        };
        add(&file, 0, 0, BlockKind::Text, block, &quiet()).await.unwrap();

        let id = first_block(&file).id().to_string();
        format(&file, 0, id.clone(), 0, 5, InlineMark::Bold, &quiet()).unwrap();

        match first_block(&file) {
            Block::Text(text) => assert_eq!(text.content, "<b>Hello</b> world"),
            other => panic!("unexpected block {:?}", other),
        }

        let err = format(&file, 0, id.clone(), 1, 3, InlineMark::Italic, &quiet()).unwrap_err();
        assert!(err.to_string().contains("splits a tag"));
        match first_block(&file) {
            Block::Text(text) => assert_eq!(text.content, "<b>Hello</b> world"),
            other => panic!("unexpected block {:?}", other),
        }

        delete(&file, 0, id, &quiet()).unwrap();
        assert!(load_document(&file).unwrap().pages[0].blocks.is_empty());
    }

    #[tokio::test]
    async fn test_add_media_by_url_and_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.json");
        new(&file, "Media".to_string(), None, &quiet()).unwrap();

        let video = NewBlock {
            url: Some("https://example.com/v.mp4".to_string()),
            caption: Some("Clip".to_string()),
            ..NewBlock::default()
        };
        add(&file, 0, 0, BlockKind::Video, video, &quiet()).await.unwrap();

        let image_path = temp.path().join("a.png");
        std::fs::write(&image_path, b"png").unwrap();
        let image = NewBlock {
            file: Some(image_path),
            ..NewBlock::default()
        };
        add(&file, 0, 0, BlockKind::Image, image, &quiet()).await.unwrap();

        let doc = load_document(&file).unwrap();
        assert_eq!(doc.pages[0].blocks.len(), 2);
        match &doc.pages[0].blocks[0] {
            Block::Media(media) => assert!(media.source.starts_with("data:image/png;base64,")),
            other => panic!("unexpected block {:?}", other),
        }
        match &doc.pages[0].blocks[1] {
            Block::Media(media) => assert_eq!(media.caption.as_deref(), Some("Clip")),
            other => panic!("unexpected block {:?}", other),
        }

        let cancelled = NewBlock::default();
        add(&file, 0, 0, BlockKind::Audio, cancelled, &quiet()).await.unwrap();
        assert_eq!(load_document(&file).unwrap().pages[0].blocks.len(), 2);
    }

    #[test]
    fn test_publish_writes_library_copy() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.json");
        new(&file, "Post".to_string(), None, &quiet()).unwrap();

        let mut config = Config::default();
        config.data_dir = temp.path().join("data");
        publish(&config, &file, &quiet()).unwrap();

        let doc = load_document(&file).unwrap();
        assert!(matches!(doc.status, DocumentStatus::Published { .. }));
        let store = DocumentStore::new(config.documents_dir());
        assert!(store.load_published(doc.id).unwrap().is_some());
    }
}
