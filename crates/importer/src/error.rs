use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Scryfall API request failed: {0}")]
    RemoteApiError(String),

    #[error("Failed to download file from {url}: HTTP {status}")]
    DownloadError { url: String, status: u16 },

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to map card {card_id} ({card_name}): {message}")]
    MappingError {
        card_id: String,
        card_name: String,
        message: String,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Import failed: {0}")]
    ImportFailed(#[source] Box<ImporterError>),
}

impl ImporterError {
    /// Wraps an error that escaped per-record recovery, unless it already is one.
    pub fn import_failed(error: ImporterError) -> Self {
        match error {
            ImporterError::ImportFailed(_) => error,
            other => ImporterError::ImportFailed(Box::new(other)),
        }
    }
}
