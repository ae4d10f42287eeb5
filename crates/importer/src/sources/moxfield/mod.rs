//! Collection import from Moxfield CSV exports.
//!
//! Rows resolve their card by (name, edition, collector number), creating a
//! placeholder printing when the catalog has none, then add one physical
//! instance per counted copy. Each row runs under a savepoint so a failing
//! row is undone on its own while the rest of the file still commits.

pub mod reader;
pub mod row;

use serde::Serialize;
use storage::CatalogTransaction;
use storage::models::{CardData, NewCardInstance};
use uuid::Uuid;

pub use reader::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS, validate_header};
pub use row::MoxfieldRow;

use crate::error::{ImporterError, Result};
use crate::stats::MoxfieldImportStats;
use crate::traits::ImportContext;

pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct ImportFormat {
    pub name: &'static str,
    pub description: &'static str,
    pub file_type: &'static str,
    pub required_columns: Vec<&'static str>,
    pub optional_columns: Vec<&'static str>,
    pub max_file_size: &'static str,
    pub encoding: &'static str,
}

/// Import formats accepted for collection uploads.
pub fn supported_formats() -> Vec<ImportFormat> {
    vec![ImportFormat {
        name: "moxfield",
        description: "Moxfield collection export (CSV)",
        file_type: "csv",
        required_columns: REQUIRED_COLUMNS.to_vec(),
        optional_columns: OPTIONAL_COLUMNS.to_vec(),
        max_file_size: "10MB",
        encoding: "UTF-8",
    }]
}

#[derive(Debug, Clone, Copy, Default)]
struct RowOutcome {
    card_created: bool,
    instances_created: usize,
}

#[derive(Debug, Default)]
pub struct MoxfieldImporter;

impl MoxfieldImporter {
    pub fn new() -> Self {
        Self
    }

    /// Imports `content` into `collection_id`.
    ///
    /// Fails only when the collection does not exist. Anything else that goes
    /// wrong outside a single row rolls the run back and is reported as a
    /// row 0 entry in the returned stats.
    pub async fn import(
        &self,
        content: &str,
        collection_id: Uuid,
        context: &ImportContext,
    ) -> Result<MoxfieldImportStats> {
        if !context.store.collection_exists(collection_id).await? {
            return Err(ImporterError::NotFoundError(format!(
                "Collection {}",
                collection_id
            )));
        }

        tracing::info!(collection_id = %collection_id, "Starting Moxfield import");
        let mut stats = MoxfieldImportStats::default();

        match self.import_rows(content, collection_id, context, &mut stats).await {
            Ok(()) => tracing::info!(
                processed = stats.processed,
                cards_created = stats.cards_created,
                cards_found = stats.cards_found,
                instances_created = stats.instances_created,
                errors = stats.errors.len(),
                "Moxfield import completed"
            ),
            Err(e) => {
                tracing::error!(collection_id = %collection_id, "Moxfield import failed: {}", e);
                stats.record_error(0, format!("Critical import error: {}", e));
            }
        }

        Ok(stats)
    }

    async fn import_rows(
        &self,
        content: &str,
        collection_id: Uuid,
        context: &ImportContext,
        stats: &mut MoxfieldImportStats,
    ) -> Result<()> {
        let rows = reader::parse_rows(content)?;
        let mut tx = context.store.begin().await?;

        match process_rows(tx.as_mut(), &rows, collection_id, stats).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_error);
                }
                Err(e)
            }
        }
    }
}

async fn process_rows(
    tx: &mut dyn CatalogTransaction,
    rows: &[reader::CsvRow],
    collection_id: Uuid,
    stats: &mut MoxfieldImportStats,
) -> Result<()> {
    for (index, csv_row) in rows.iter().enumerate() {
        let row_number = index + 1;
        stats.processed += 1;

        tx.savepoint().await?;
        match import_row(tx, csv_row, collection_id).await {
            Ok(outcome) => {
                tx.release_savepoint().await?;
                if outcome.card_created {
                    stats.cards_created += 1;
                } else {
                    stats.cards_found += 1;
                }
                stats.instances_created += outcome.instances_created;
            }
            Err(e) => {
                tx.rollback_to_savepoint().await?;
                tracing::warn!(row = row_number, "Moxfield import error: {}", e);
                stats.record_error(row_number, format!("Error processing row: {}", e));
            }
        }
    }
    Ok(())
}

async fn import_row(
    tx: &mut dyn CatalogTransaction,
    csv_row: &reader::CsvRow,
    collection_id: Uuid,
) -> Result<RowOutcome> {
    let row = MoxfieldRow::from_csv(csv_row)?;

    let (card_id, card_created) = match tx.find_card_by_printing(&row.printing_key()).await? {
        Some(card_id) => (card_id, false),
        None => {
            let card = CardData::placeholder(
                row.name.clone(),
                row.edition.clone(),
                row.collector_number.clone(),
            );
            (tx.insert_card(&card).await?, true)
        }
    };

    let instance = NewCardInstance {
        card_id,
        collection_id,
        condition: row.condition,
        foil: row.foil,
        language: row.language.clone(),
        tags: row.tags.clone(),
        purchase_price: row.purchase_price,
        alter: row.alter,
        proxy: row.proxy,
    };
    for _ in 0..row.count {
        tx.insert_card_instance(&instance).await?;
    }

    Ok(RowOutcome {
        card_created,
        instances_created: row.count as usize,
    })
}
