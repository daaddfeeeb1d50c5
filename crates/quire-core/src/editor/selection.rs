//! Text selection and the formatting toolbar

use std::ops::Range;

use crate::markup::InlineMark;
use crate::models::{BlockId, SelectionRect};

/// A text selection inside one block, captured on pointer release
#[derive(Debug, Clone, PartialEq)]
pub struct TextSelection {
    pub page: usize,
    pub block_id: BlockId,
    /// Byte range within the block's content
    pub range: Range<usize>,
    pub rect: SelectionRect,
}

impl TextSelection {
    pub fn new(page: usize, block_id: BlockId, range: Range<usize>) -> Self {
        Self {
            page,
            block_id,
            range,
            rect: SelectionRect::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range.start >= self.range.end
    }
}

/// Formatting toolbar shown over an active selection
#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar {
    pub selection: TextSelection,
}

impl Toolbar {
    /// Marks offered by the toolbar
    pub const MARKS: [InlineMark; 4] = [
        InlineMark::Bold,
        InlineMark::Italic,
        InlineMark::Underline,
        InlineMark::Strikethrough,
    ];

    pub fn rect(&self) -> SelectionRect {
        self.selection.rect
    }
}
