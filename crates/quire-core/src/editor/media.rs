//! Media ingestion
//!
//! Local files become self-contained `data:` URIs; remote URLs are used
//! verbatim once they are known to be non-empty.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while ingesting media
#[derive(Error, Debug)]
pub enum IngestError {
    /// File reading is not possible in this environment
    #[error("File reading is not available: {0}")]
    Unavailable(String),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No URL given")]
    EmptyUrl,
}

impl IngestError {
    fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::Unsupported => IngestError::Unavailable(err.to_string()),
            _ => IngestError::Read {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// Converts a local file into an embeddable reference
pub trait MediaIngest {
    fn ingest(&self, path: &Path) -> impl Future<Output = Result<String, IngestError>> + Send;
}

/// Reads files from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FileIngest;

impl MediaIngest for FileIngest {
    async fn ingest(&self, path: &Path) -> Result<String, IngestError> {
        ingest_file(path).await
    }
}

/// Read a file and encode it as a `data:` URI
pub async fn ingest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| IngestError::from_io(e, path))?;
    debug!("Ingested {} bytes from {:?}", bytes.len(), path);
    Ok(data_uri(mime_type(path), &bytes))
}

/// Build a base64 `data:` URI
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Guess a MIME type from the file extension
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// Accept a remote URL as-is unless it is missing or blank
pub fn accept_url(url: Option<&str>) -> Result<String, IngestError> {
    match url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(IngestError::EmptyUrl),
    }
}
