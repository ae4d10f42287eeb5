//! Bulk catalog import from Scryfall.
//!
//! A run resolves a bulk file (remote dataset type, explicit URL, or local
//! path), downloads it to a scratch file when needed, then streams its
//! records through the mapper into the catalog inside a single transaction.

pub mod bulk_data;
pub mod client;
pub mod config;
pub mod mapper;
pub mod models;
pub mod parser;
pub mod rate_limit;
pub mod upsert;

#[cfg(test)]
mod test_server;

use std::path::{Path, PathBuf};

use serde_json::Value;
use storage::CatalogTransaction;

pub use bulk_data::{BulkDataEntry, BulkDataSource};
pub use client::ScryfallClient;
pub use config::ScryfallConfig;
pub use rate_limit::RateLimiter;

use crate::error::{ImporterError, Result};
use crate::stats::ImportStats;
use crate::traits::ImportContext;

pub const DEFAULT_DATA_TYPE: &str = "default_cards";
pub const DEFAULT_SKIP_LAYOUTS: [&str; 5] = ["token", "emblem", "planar", "scheme", "vanguard"];
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const MIN_BATCH_SIZE: usize = 100;
pub const MAX_BATCH_SIZE: usize = 5000;

const PROGRESS_INTERVAL: usize = 10_000;

/// Where the bulk file for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Url(String),
    File(PathBuf),
    Latest { data_type: String },
}

impl ImportSource {
    /// `http(s)` URLs are downloaded, anything else is read as a local path.
    pub fn parse(source: &str) -> Self {
        match reqwest::Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                ImportSource::Url(source.to_string())
            }
            _ => ImportSource::File(PathBuf::from(source)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub skip_layouts: Vec<String>,
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_layouts: DEFAULT_SKIP_LAYOUTS.iter().map(|l| l.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

pub fn validate_batch_size(batch_size: usize) -> Result<usize> {
    if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&batch_size) {
        return Err(ImporterError::ValidationError(format!(
            "Batch size must be between {} and {}",
            MIN_BATCH_SIZE, MAX_BATCH_SIZE
        )));
    }
    Ok(batch_size)
}

pub struct ScryfallImporter {
    client: ScryfallClient,
    scratch_dir: PathBuf,
}

impl ScryfallImporter {
    pub fn new(client: ScryfallClient) -> Self {
        Self {
            client,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Directory that holds downloaded bulk files for the length of a run.
    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    pub fn client(&self) -> &ScryfallClient {
        &self.client
    }

    pub async fn import(
        &self,
        source: ImportSource,
        options: &ImportOptions,
        context: &ImportContext,
    ) -> Result<ImportStats> {
        let url = match source {
            ImportSource::File(path) => return Self::import_file(&path, options, context).await,
            ImportSource::Url(url) => url,
            ImportSource::Latest { data_type } => {
                tracing::info!(state = "resolving", "Resolving bulk data type '{}'", data_type);
                BulkDataSource::new(&self.client)
                    .resolve_url(&data_type)
                    .await?
            }
        };

        let scratch = tempfile::Builder::new()
            .prefix("scryfall_bulk_")
            .suffix(".json")
            .tempfile_in(&self.scratch_dir)?;

        tracing::info!(state = "downloading", "Downloading bulk data from {}", url);
        self.client.download_to_file(&url, scratch.path()).await?;

        Self::import_file(scratch.path(), options, context).await
    }

    /// Streams a local bulk file into the catalog in one transaction.
    pub async fn import_file(
        path: &Path,
        options: &ImportOptions,
        context: &ImportContext,
    ) -> Result<ImportStats> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ImporterError::FileNotFound(path.to_path_buf()));
        }
        let size = tokio::fs::metadata(path).await?.len();
        tracing::info!(
            state = "streaming",
            "Importing {} ({:.2} MB)",
            path.display(),
            size as f64 / 1024.0 / 1024.0
        );

        let mut stats = ImportStats::default();
        let mut tx = context.store.begin().await?;

        match stream_records(tx.as_mut(), path, options, &mut stats).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| ImporterError::import_failed(e.into()))?;
                tracing::info!(
                    state = "committed",
                    processed = stats.processed,
                    created = stats.created,
                    updated = stats.updated,
                    skipped = stats.skipped,
                    errors = stats.errors,
                    "Scryfall import completed"
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::error!(
                    state = "rolled_back",
                    processed = stats.processed,
                    "Scryfall import failed: {}",
                    e
                );
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_error);
                }
                Err(ImporterError::import_failed(e))
            }
        }
    }
}

async fn stream_records(
    tx: &mut dyn CatalogTransaction,
    path: &Path,
    options: &ImportOptions,
    stats: &mut ImportStats,
) -> Result<()> {
    let batch_size = options.batch_size.max(1);
    let mut records = parser::spawn_record_stream(path.to_path_buf());
    let mut batch = Vec::with_capacity(batch_size);

    while let Some(record) = records.recv().await {
        let record = record?;
        stats.processed += 1;

        if let Some(reason) = skip_reason(&record, &options.skip_layouts) {
            tracing::trace!("Skipping record: {}", reason);
            stats.skipped += 1;
        } else {
            match mapper::map_record(record) {
                Ok(card) => batch.push(card),
                Err(ImporterError::MappingError {
                    card_id,
                    card_name,
                    message,
                }) => {
                    tracing::warn!(card_id = %card_id, card_name = %card_name, "Failed to map card: {}", message);
                    stats.record_error(card_id, card_name, message);
                }
                Err(e) => return Err(e),
            }
        }

        if batch.len() >= batch_size {
            upsert::upsert_batch(tx, &batch, stats).await?;
            batch.clear();
        }

        if stats.processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                processed = stats.processed,
                created = stats.created,
                updated = stats.updated,
                "Import progress"
            );
        }
    }

    if !batch.is_empty() {
        upsert::upsert_batch(tx, &batch, stats).await?;
    }

    Ok(())
}

fn skip_reason(record: &Value, skip_layouts: &[String]) -> Option<String> {
    let object = record.get("object").and_then(Value::as_str);
    if object != Some("card") {
        return Some(format!("object type {}", object.unwrap_or("missing")));
    }

    record
        .get("layout")
        .and_then(Value::as_str)
        .filter(|layout| skip_layouts.iter().any(|skip| skip == layout))
        .map(|layout| format!("layout {}", layout))
}
