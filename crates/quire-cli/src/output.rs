//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use quire_core::notice::{Notice, NoticeLevel};
use quire_core::{Block, Document, DocumentStatus, Highlight, SearchResult};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print rendered pages, left page first
    pub fn print_pages(&self, pages: &[(usize, String)], total: usize, progress: u8) {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("(empty)");
                    return;
                }
                for (i, (page, text)) in pages.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("── Page {} of {} ──", page + 1, total);
                    println!("{}", text);
                }
                println!();
                println!("{}% read", progress);
            }
            OutputFormat::Json => {
                let json_pages: Vec<_> = pages
                    .iter()
                    .map(|(page, text)| serde_json::json!({"page": page, "content": text}))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "pages": json_pages,
                        "total_pages": total,
                        "progress": progress
                    })
                );
            }
            OutputFormat::Quiet => {
                for (page, _) in pages {
                    println!("{}", page);
                }
            }
        }
    }

    /// Print search results
    pub fn print_search_results(&self, query: &str, results: &[SearchResult]) {
        match self.format {
            OutputFormat::Human => {
                if results.is_empty() {
                    println!("No matches for \"{}\".", query);
                    return;
                }
                for (i, result) in results.iter().enumerate() {
                    println!("[{}] page {:>4} | {}", i, result.page + 1, one_line(&result.snippet));
                }
                println!("\n{} page(s) match", results.len());
            }
            OutputFormat::Json => {
                println!("{}", json_pretty(&results));
            }
            OutputFormat::Quiet => {
                for result in results {
                    println!("{}", result.page);
                }
            }
        }
    }

    /// Print bookmarked pages (zero-based in JSON/quiet, one-based for humans)
    pub fn print_bookmarks(&self, bookmarks: &[usize]) {
        match self.format {
            OutputFormat::Human => {
                if bookmarks.is_empty() {
                    println!("No bookmarks.");
                    return;
                }
                for page in bookmarks {
                    println!("page {}", page + 1);
                }
                println!("\n{} bookmark(s)", bookmarks.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "bookmarks": bookmarks }));
            }
            OutputFormat::Quiet => {
                for page in bookmarks {
                    println!("{}", page);
                }
            }
        }
    }

    /// Print a list of highlights
    pub fn print_highlights(&self, highlights: &[Highlight]) {
        match self.format {
            OutputFormat::Human => {
                if highlights.is_empty() {
                    println!("No highlights.");
                    return;
                }
                for h in highlights {
                    println!(
                        "{} | page {:>4} | {}",
                        &h.id.to_string()[..8],
                        h.page + 1,
                        truncate(&one_line(&h.text), 50)
                    );
                }
                println!("\n{} highlight(s)", highlights.len());
            }
            OutputFormat::Json => {
                println!("{}", json_pretty(&highlights));
            }
            OutputFormat::Quiet => {
                for h in highlights {
                    println!("{}", h.id);
                }
            }
        }
    }

    /// Print a document outline
    pub fn print_document(&self, doc: &Document) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", doc.id);
                println!("Title:  {}", doc.title);
                if let Some(ref author) = doc.author {
                    println!("Author: {}", author);
                }
                match &doc.status {
                    DocumentStatus::Draft => println!("Status: draft"),
                    DocumentStatus::Published { at } => {
                        println!("Status: published {}", at.format("%Y-%m-%d %H:%M"))
                    }
                }

                for (index, page) in doc.pages.iter().enumerate() {
                    println!();
                    println!("── Page {} ({} blocks) ──", index, page.blocks.len());
                    for block in &page.blocks {
                        println!("{}", describe_block(block));
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", json_pretty(doc));
            }
            OutputFormat::Quiet => {
                println!("{}", doc.id);
            }
        }
    }

    /// Print notices queued by a session to stderr
    pub fn print_notices(&self, notices: &[Notice]) {
        if self.is_quiet() {
            return;
        }
        for notice in notices {
            let marker = match notice.level {
                NoticeLevel::Info => "ℹ",
                NoticeLevel::Warning => "⚠",
                NoticeLevel::Error => "✗",
            };
            eprintln!("{} {}", marker, notice.message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn json_pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    })
}

/// One-line summary of a block for the document outline
fn describe_block(block: &Block) -> String {
    match block {
        Block::Text(text) => format!("{}  text   {}", block.id(), truncate(&one_line(&text.content), 50)),
        Block::Media(media) => {
            let caption = media
                .caption
                .as_deref()
                .map(|c| format!(" \"{}\"", truncate(c, 30)))
                .unwrap_or_default();
            format!(
                "{}  {:<6} {}{}",
                block.id(),
                media.kind.as_str(),
                truncate(&media.source, 40),
                caption
            )
        }
    }
}

/// Collapse whitespace runs (including newlines) to single spaces
fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("line one\n\nline   two"), "line one line two");
    }

    #[test]
    fn test_describe_media_block() {
        let block = Block::media(
            quire_core::MediaKind::Video,
            "https://example.com/v.mp4",
            Some("Intro".to_string()),
        );
        let line = describe_block(&block);
        assert!(line.contains("video"));
        assert!(line.ends_with("https://example.com/v.mp4 \"Intro\""));
    }
}
