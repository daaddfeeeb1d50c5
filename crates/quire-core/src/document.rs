//! Document model operations
//!
//! Pure mutations over a [`Document`]: block insertion, deletion, reordering
//! and text edits, plus page management. Blocks not touched by an operation
//! keep their ids and contents.
//!
//! Index-based operations with an invalid index fail with an out-of-range
//! error. Operations naming a block id that no longer exists are silent
//! no-ops so callers holding stale ids stay resilient.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Block, BlockId, Document, Page};

/// Errors that can occur during document operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Page index {index} out of range (document has {len} pages)")]
    PageOutOfRange { index: usize, len: usize },

    #[error("Block index {index} out of range for page {page} ({len} blocks)")]
    BlockOutOfRange { page: usize, index: usize, len: usize },

    #[error("Block id {0} already exists in the document")]
    DuplicateBlock(BlockId),

    #[error("Invalid block order for page {page}: {reason}")]
    InvalidOrder { page: usize, reason: String },
}

impl DocumentError {
    /// Whether this error reports an invalid page or block index
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            DocumentError::PageOutOfRange { .. } | DocumentError::BlockOutOfRange { .. }
        )
    }
}

impl Document {
    /// Get a page by index
    pub fn page(&self, index: usize) -> Result<&Page, DocumentError> {
        let len = self.pages.len();
        self.pages
            .get(index)
            .ok_or(DocumentError::PageOutOfRange { index, len })
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut Page, DocumentError> {
        let len = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(DocumentError::PageOutOfRange { index, len })
    }

    /// Whether any page holds a block with this id
    pub fn contains_block(&self, id: &BlockId) -> bool {
        self.pages.iter().any(|p| p.position(id).is_some())
    }

    /// Find a block on a page
    pub fn find_block(&self, page_index: usize, id: &BlockId) -> Option<&Block> {
        self.pages
            .get(page_index)?
            .blocks
            .iter()
            .find(|b| b.id() == id)
    }

    // ==================== Blocks ====================

    /// Insert `block` at `block_index` on page `page_index`
    ///
    /// `block_index` may equal the page's block count to append.
    pub fn insert_block(
        &mut self,
        page_index: usize,
        block_index: usize,
        block: Block,
    ) -> Result<(), DocumentError> {
        self.page(page_index)?;
        if self.contains_block(block.id()) {
            return Err(DocumentError::DuplicateBlock(block.id().clone()));
        }

        let page = self.page_mut(page_index)?;
        let len = page.blocks.len();
        if block_index > len {
            return Err(DocumentError::BlockOutOfRange {
                page: page_index,
                index: block_index,
                len,
            });
        }

        page.blocks.insert(block_index, block);
        Ok(())
    }

    /// Remove the block with the given id from a page
    ///
    /// Returns the removed block, or `None` when no such block exists.
    pub fn delete_block(
        &mut self,
        page_index: usize,
        id: &BlockId,
    ) -> Result<Option<Block>, DocumentError> {
        let page = self.page_mut(page_index)?;
        Ok(page.position(id).map(|pos| page.blocks.remove(pos)))
    }

    /// Replace a page's block sequence with the order given by `new_order`
    ///
    /// `new_order` must be a permutation of the page's current block ids.
    pub fn reorder_blocks(
        &mut self,
        page_index: usize,
        new_order: &[BlockId],
    ) -> Result<(), DocumentError> {
        let page = self.page_mut(page_index)?;

        if new_order.len() != page.blocks.len() {
            return Err(DocumentError::InvalidOrder {
                page: page_index,
                reason: format!(
                    "expected {} ids, got {}",
                    page.blocks.len(),
                    new_order.len()
                ),
            });
        }

        let mut seen = HashSet::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(id) {
                return Err(DocumentError::InvalidOrder {
                    page: page_index,
                    reason: format!("duplicate id {}", id),
                });
            }
            if page.position(id).is_none() {
                return Err(DocumentError::InvalidOrder {
                    page: page_index,
                    reason: format!("unknown id {}", id),
                });
            }
        }

        let mut remaining: Vec<Option<Block>> = page.blocks.drain(..).map(Some).collect();
        for id in new_order {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|b| b.id() == id));
            if let Some(block) = slot.and_then(Option::take) {
                page.blocks.push(block);
            }
        }
        Ok(())
    }

    /// Replace the content of a text block
    ///
    /// Returns false (and changes nothing) when the block is missing or is
    /// not a text block.
    pub fn edit_text_block(
        &mut self,
        page_index: usize,
        id: &BlockId,
        new_content: impl Into<String>,
    ) -> Result<bool, DocumentError> {
        let page = self.page_mut(page_index)?;
        match page.blocks.iter_mut().find(|b| b.id() == id) {
            Some(Block::Text(text)) => {
                text.content = new_content.into();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Set or clear the caption of a media block
    pub fn set_media_caption(
        &mut self,
        page_index: usize,
        id: &BlockId,
        caption: Option<String>,
    ) -> Result<bool, DocumentError> {
        let page = self.page_mut(page_index)?;
        match page.blocks.iter_mut().find(|b| b.id() == id) {
            Some(Block::Media(media)) => {
                media.caption = caption;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // ==================== Pages ====================

    /// Insert an empty page at `index` (may equal the page count)
    pub fn insert_page(&mut self, index: usize) -> Result<(), DocumentError> {
        let len = self.pages.len();
        if index > len {
            return Err(DocumentError::PageOutOfRange { index, len });
        }
        self.pages.insert(index, Page::new());
        Ok(())
    }

    /// Remove the page at `index` and return it
    pub fn remove_page(&mut self, index: usize) -> Result<Page, DocumentError> {
        self.page(index)?;
        Ok(self.pages.remove(index))
    }
}
