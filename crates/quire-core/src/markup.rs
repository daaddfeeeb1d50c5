//! Inline markup
//!
//! Text block content carries four inline marks written as short tags:
//! `<b>` bold, `<i>` italic, `<u>` underline and `<s>` strikethrough.
//! This module toggles those marks over a byte range and strips markup
//! for word counting and read-aloud.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inline formatting mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineMark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl InlineMark {
    /// Tag name used in content
    pub fn tag(self) -> &'static str {
        match self {
            InlineMark::Bold => "b",
            InlineMark::Italic => "i",
            InlineMark::Underline => "u",
            InlineMark::Strikethrough => "s",
        }
    }

    pub fn open_tag(self) -> String {
        format!("<{}>", self.tag())
    }

    pub fn close_tag(self) -> String {
        format!("</{}>", self.tag())
    }
}

/// Result of toggling a mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub content: String,
    /// The selected text's range within the new content
    pub selection: Range<usize>,
    /// Whether the mark is now applied
    pub applied: bool,
}

/// Toggle `mark` over `range` of `content`
///
/// If the range is already wrapped in the mark (either the tags sit just
/// outside the range or the range starts and ends with them) the mark is
/// removed, otherwise the range is wrapped. Returns `None` for an empty
/// range, one that is out of bounds or not on character boundaries, and
/// one that starts or ends inside a tag.
pub fn toggle_mark(content: &str, range: Range<usize>, mark: InlineMark) -> Option<Toggled> {
    if !is_valid_range(content, &range) || splits_tag(content, &range) {
        return None;
    }

    let open = mark.open_tag();
    let close = mark.close_tag();
    let (start, end) = (range.start, range.end);
    let before = &content[..start];
    let selected = &content[start..end];
    let after = &content[end..];

    if before.ends_with(&open) && after.starts_with(&close) {
        let outer_start = start - open.len();
        let new_content = format!("{}{}{}", &before[..outer_start], selected, &after[close.len()..]);
        return Some(Toggled {
            content: new_content,
            selection: outer_start..end - open.len(),
            applied: false,
        });
    }

    if selected.len() >= open.len() + close.len()
        && selected.starts_with(&open)
        && selected.ends_with(&close)
    {
        let inner = &selected[open.len()..selected.len() - close.len()];
        return Some(Toggled {
            content: format!("{}{}{}", before, inner, after),
            selection: start..start + inner.len(),
            applied: false,
        });
    }

    Some(Toggled {
        content: format!("{}{}{}{}{}", before, open, selected, close, after),
        selection: start + open.len()..end + open.len(),
        applied: true,
    })
}

/// Whether `range` selects a non-empty, well-formed slice of `content`
pub fn is_valid_range(content: &str, range: &Range<usize>) -> bool {
    range.start < range.end
        && range.end <= content.len()
        && content.is_char_boundary(range.start)
        && content.is_char_boundary(range.end)
}

/// Whether either end of `range` falls strictly inside a tag
pub fn splits_tag(content: &str, range: &Range<usize>) -> bool {
    tag_regex().find_iter(content).any(|tag| {
        let inside = tag.start() + 1..tag.end();
        inside.contains(&range.start) || inside.contains(&range.end)
    })
}

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| {
        Regex::new(r"</?[A-Za-z][A-Za-z0-9]*\s*/?>").expect("Failed to compile inline tag regex")
    })
}

/// Remove all inline tags, leaving the plain text
pub fn strip_tags(content: &str) -> String {
    tag_regex().replace_all(content, "").into_owned()
}

/// Count whitespace-separated words of the plain text
pub fn word_count(content: &str) -> usize {
    strip_tags(content).split_whitespace().count()
}
