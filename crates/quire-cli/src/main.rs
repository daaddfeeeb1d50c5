//! Quire CLI
//!
//! Command-line interface for Quire - reading and authoring paged documents.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quire_core::editor::BlockKind;
use quire_core::{Config, InlineMark, StorageError};

mod commands;
mod content;
mod input;
mod output;
mod speech;

use commands::doc::NewBlock;
use commands::read::Navigation;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Quire - read, annotate and author paged documents")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current page(s) of a file
    Read {
        /// Document (.json) or text file (pages separated by form feeds)
        file: PathBuf,
        /// Go to page N (1-based)
        #[arg(short, long, conflicts_with_all = ["next", "prev"])]
        page: Option<usize>,
        /// Go forward one spread
        #[arg(short, long, conflicts_with = "prev")]
        next: bool,
        /// Go back one spread
        #[arg(long)]
        prev: bool,
        /// Viewport width in columns (defaults to $COLUMNS)
        #[arg(short, long)]
        width: Option<u16>,
    },
    /// Search a file
    Search {
        file: PathBuf,
        /// Text to find (case-insensitive)
        query: String,
        /// Jump to result N (0-based, as listed)
        #[arg(long)]
        open: Option<usize>,
    },
    /// Manage bookmarks
    Bookmark {
        file: PathBuf,
        #[command(subcommand)]
        command: BookmarkCommands,
    },
    /// Manage highlights
    #[command(alias = "hl")]
    Highlight {
        file: PathBuf,
        #[command(subcommand)]
        command: HighlightCommands,
    },
    /// Read the current page aloud
    Speak {
        file: PathBuf,
        /// Page to read (1-based, defaults to the current page)
        #[arg(short, long)]
        page: Option<usize>,
    },
    /// Show reading position and annotations
    Status { file: PathBuf },
    /// Author documents
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookmarkCommands {
    /// Add or remove a bookmark (1-based page, defaults to the current page)
    Toggle { page: Option<usize> },
    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove { page: usize },
    /// List bookmarks
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
enum HighlightCommands {
    /// Highlight text on the current page
    Add {
        text: String,
        /// Page the text is on (1-based)
        #[arg(short, long)]
        page: Option<usize>,
    },
    /// Remove a highlight
    #[command(alias = "rm")]
    Remove {
        /// Highlight ID (full UUID or prefix)
        id: String,
    },
    /// List highlights
    #[command(alias = "ls")]
    List {
        /// Only highlights on this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// Create a new document
    New {
        file: PathBuf,
        title: String,
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Show a document's pages and blocks
    Show { file: PathBuf },
    /// Insert an empty page (0-based index, appended by default)
    AddPage { file: PathBuf, index: Option<usize> },
    /// Remove a page
    RemovePage { file: PathBuf, index: usize },
    /// Insert a block
    Add {
        file: PathBuf,
        page: usize,
        index: usize,
        kind: KindArg,
        /// Initial text of a text block
        #[arg(long)]
        text: Option<String>,
        /// Local media file to embed
        #[arg(long, conflicts_with = "url")]
        path: Option<PathBuf>,
        /// Remote media URL
        #[arg(long)]
        url: Option<String>,
        /// Media caption
        #[arg(long)]
        caption: Option<String>,
    },
    /// Replace a text block's content (reads stdin when TEXT is omitted)
    Edit {
        file: PathBuf,
        page: usize,
        block: String,
        text: Option<String>,
    },
    /// Toggle an inline mark over a byte range of a text block
    Format {
        file: PathBuf,
        page: usize,
        block: String,
        start: usize,
        end: usize,
        mark: MarkArg,
    },
    /// Set a media caption (omit to clear)
    Caption {
        file: PathBuf,
        page: usize,
        block: String,
        caption: Option<String>,
    },
    /// Delete a block
    #[command(alias = "rm")]
    Delete {
        file: PathBuf,
        page: usize,
        block: String,
    },
    /// Reorder a page's blocks
    Move {
        file: PathBuf,
        page: usize,
        /// Every block id of the page, in the new order
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Save a draft copy to the library
    Save { file: PathBuf },
    /// Publish the document
    Publish { file: PathBuf },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, dual_page_min_width, snippet_context,
        /// speech_command, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Text,
    Image,
    Video,
    Audio,
}

impl From<KindArg> for BlockKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => BlockKind::Text,
            KindArg::Image => BlockKind::Image,
            KindArg::Video => BlockKind::Video,
            KindArg::Audio => BlockKind::Audio,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MarkArg {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl From<MarkArg> for InlineMark {
    fn from(mark: MarkArg) -> Self {
        match mark {
            MarkArg::Bold => InlineMark::Bold,
            MarkArg::Italic => InlineMark::Italic,
            MarkArg::Underline => InlineMark::Underline,
            MarkArg::Strikethrough => InlineMark::Strikethrough,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            if let Some(hint) = recovery_hint(&e) {
                eprintln!("\nHint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Recovery suggestion of the first storage error in the chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<StorageError>())
        .find_map(StorageError::recovery_suggestion)
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands load and save the configuration themselves
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config);

    match cli.command {
        Commands::Read {
            file,
            page,
            next,
            prev,
            width,
        } => {
            let navigation = match (page, next, prev) {
                (Some(page), _, _) => Navigation::Page(page),
                (None, true, _) => Navigation::Next,
                (None, false, true) => Navigation::Previous,
                (None, false, false) => Navigation::Stay,
            };
            commands::read::read(&config, &file, navigation, width, &output)
        }
        Commands::Search { file, query, open } => {
            commands::search::search(&config, &file, &query, open, &output)
        }
        Commands::Bookmark { file, command } => match command {
            BookmarkCommands::Toggle { page } => {
                commands::bookmark::toggle(&config, &file, page, &output)
            }
            BookmarkCommands::Remove { page } => {
                commands::bookmark::remove(&config, &file, page, &output)
            }
            BookmarkCommands::List => commands::bookmark::list(&config, &file, &output),
        },
        Commands::Highlight { file, command } => match command {
            HighlightCommands::Add { text, page } => {
                commands::highlight::add(&config, &file, text, page, &output)
            }
            HighlightCommands::Remove { id } => {
                commands::highlight::remove(&config, &file, &id, &output)
            }
            HighlightCommands::List { page } => {
                commands::highlight::list(&config, &file, page, &output)
            }
        },
        Commands::Speak { file, page } => {
            commands::speak::speak(&config, &file, page, &output).await
        }
        Commands::Status { file } => commands::status::show(&config, &file, &output),
        Commands::Doc { command } => handle_doc_command(command, &config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_doc_command(command: DocCommands, config: &Config, output: &Output) -> Result<()> {
    use commands::doc;

    match command {
        DocCommands::New {
            file,
            title,
            author,
        } => doc::new(&file, title, author, output),
        DocCommands::Show { file } => doc::show(&file, output),
        DocCommands::AddPage { file, index } => doc::add_page(&file, index, output),
        DocCommands::RemovePage { file, index } => doc::remove_page(&file, index, output),
        DocCommands::Add {
            file,
            page,
            index,
            kind,
            text,
            path,
            url,
            caption,
        } => {
            let block = NewBlock {
                text,
                file: path,
                url,
                caption,
            };
            doc::add(&file, page, index, kind.into(), block, output).await
        }
        DocCommands::Edit {
            file,
            page,
            block,
            text,
        } => doc::edit(&file, page, block, text, output),
        DocCommands::Format {
            file,
            page,
            block,
            start,
            end,
            mark,
        } => doc::format(&file, page, block, start, end, mark.into(), output),
        DocCommands::Caption {
            file,
            page,
            block,
            caption,
        } => doc::caption(&file, page, block, caption, output),
        DocCommands::Delete { file, page, block } => doc::delete(&file, page, block, output),
        DocCommands::Move { file, page, ids } => doc::reorder(&file, page, ids, output),
        DocCommands::Save { file } => doc::save(config, &file, output),
        DocCommands::Publish { file } => doc::publish(config, &file, output),
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Initialize logging
///
/// Only initializes if QUIRE_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("QUIRE_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::options().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("quire_core={},quire={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
