//! Highlight overlay rendering
//!
//! All highlights of a page are matched in a single pass over one
//! alternation pattern, so a marker inserted for one highlight is never
//! re-wrapped by another. Alternatives are ordered longest first: when two
//! highlights could match at the same position the longer one wins. Where
//! matches overlap at different positions the leftmost one wins.

use std::borrow::Cow;
use std::collections::HashSet;

use regex::{Captures, Regex};
use tracing::warn;

/// Opening highlight marker
pub const MARK_OPEN: &str = "<mark>";
/// Closing highlight marker
pub const MARK_CLOSE: &str = "</mark>";

/// Wrap every occurrence of each highlight text in `content` with markers
///
/// Returns the content unchanged when there is nothing to highlight.
pub fn render_highlights<'c, 'h, I>(content: &'c str, highlights: I) -> Cow<'c, str>
where
    I: IntoIterator<Item = &'h str>,
{
    let Some(pattern) = alternation(highlights) else {
        return Cow::Borrowed(content);
    };

    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Highlight pattern could not be compiled: {}", e);
            return Cow::Borrowed(content);
        }
    };

    re.replace_all(content, |caps: &Captures| {
        format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
    })
}

/// Escaped, distinct highlight texts joined longest first
fn alternation<'h>(highlights: impl IntoIterator<Item = &'h str>) -> Option<String> {
    let mut seen = HashSet::new();
    let mut texts: Vec<&str> = highlights
        .into_iter()
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect();
    if texts.is_empty() {
        return None;
    }

    // Stable sort keeps insertion order among equal lengths
    texts.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        texts
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_highlight() {
        let rendered = render_highlights("The quick brown fox", ["quick"]);
        assert_eq!(rendered, "The <mark>quick</mark> brown fox");
    }

    #[test]
    fn test_no_highlights_borrows() {
        let rendered = render_highlights("plain", std::iter::empty::<&str>());
        assert!(matches!(rendered, Cow::Borrowed("plain")));
    }

    #[test]
    fn test_every_occurrence_is_wrapped() {
        let rendered = render_highlights("a cat, a cat", ["cat"]);
        assert_eq!(rendered, "a <mark>cat</mark>, a <mark>cat</mark>");
    }

    #[test]
    fn test_markers_are_not_rewrapped() {
        let rendered = render_highlights("mark the spot", ["mark", "spot"]);
        assert_eq!(rendered, "<mark>mark</mark> the <mark>spot</mark>");
    }

    #[test]
    fn test_longest_highlight_wins() {
        let rendered = render_highlights("The quick brown fox", ["quick", "quick brown"]);
        assert_eq!(rendered, "The <mark>quick brown</mark> fox");
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        let rendered = render_highlights("costs $5 (or more)", ["(or more)", "$5"]);
        assert_eq!(
            rendered,
            "costs <mark>$5</mark> <mark>(or more)</mark>"
        );
    }

    #[test]
    fn test_duplicates_and_empty_texts() {
        let rendered = render_highlights("one two", ["two", "", "two"]);
        assert_eq!(rendered, "one <mark>two</mark>");
    }

    #[test]
    fn test_alternation_collapses_duplicates() {
        assert_eq!(alternation(["ab", "cd", "ab"]).unwrap(), "ab|cd");
        assert_eq!(alternation(["a", "abc", "a.c", "abc"]).unwrap(), r"abc|a\.c|a");
        assert!(alternation(["", ""]).is_none());
    }
}
