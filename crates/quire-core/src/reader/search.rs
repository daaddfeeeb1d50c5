//! Full-text search over pages
//!
//! Each page contributes at most one result: its first case-insensitive
//! occurrence of the query, with a snippet of surrounding context.

use regex::RegexBuilder;
use tracing::warn;

use crate::models::SearchResult;

/// Marker placed before and after every snippet
pub const ELLIPSIS: &str = "...";

/// Search every page for the first occurrence of `query`
///
/// `context` is the number of characters kept on each side of the match.
/// An empty query yields no results.
pub fn search_pages<S: AsRef<str>>(pages: &[S], query: &str, context: usize) -> Vec<SearchResult> {
    if query.is_empty() {
        return Vec::new();
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("Search query could not be compiled: {}", e);
            return Vec::new();
        }
    };

    pages
        .iter()
        .enumerate()
        .filter_map(|(page, text)| {
            let text = text.as_ref();
            let found = pattern.find(text)?;
            Some(SearchResult {
                page,
                snippet: snippet(text, found.start(), found.end(), context),
            })
        })
        .collect()
}

/// Cut `context` characters either side of `start..end`, wrapped in ellipses
pub fn snippet(text: &str, start: usize, end: usize, context: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(context)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(context)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    format!("{}{}{}", ELLIPSIS, &text[from..to], ELLIPSIS)
}
