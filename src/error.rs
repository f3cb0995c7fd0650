use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

/// Per-document ingestion failure. Every variant names the offending path.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Converter '{program}' is not available (is it installed and on PATH?)")]
    ConverterUnavailable { program: String },

    #[error("Conversion failed for {}: {reason}", .path.display())]
    ConversionFailed { path: PathBuf, reason: String },

    #[error("Malformed document {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Malformed EPUB {}: {reason}", .path.display())]
    MalformedArchive { path: PathBuf, reason: String },

    #[error("Invalid book id '{0}'")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
