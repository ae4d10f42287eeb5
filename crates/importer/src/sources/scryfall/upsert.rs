use storage::CatalogTransaction;
use storage::models::CardData;

use crate::error::{ImporterError, Result};
use crate::stats::ImportStats;

/// Writes one batch of mapped cards keyed by `scryfall_id`: existing rows are
/// overwritten, new ones inserted. Runs inside the caller's transaction.
pub async fn upsert_batch(
    tx: &mut dyn CatalogTransaction,
    batch: &[CardData],
    stats: &mut ImportStats,
) -> Result<()> {
    for card in batch {
        let scryfall_id = card.scryfall_id.as_deref().ok_or_else(|| {
            ImporterError::ValidationError(format!("Card '{}' has no Scryfall id", card.title))
        })?;

        match tx.find_card_by_scryfall_id(scryfall_id).await? {
            Some(card_id) => {
                tx.update_card(card_id, card).await?;
                stats.updated += 1;
            }
            None => {
                tx.insert_card(card).await?;
                stats.created += 1;
            }
        }
    }

    stats.batches += 1;
    tracing::debug!(
        batch = stats.batches,
        size = batch.len(),
        created = stats.created,
        updated = stats.updated,
        "Flushed card batch"
    );

    Ok(())
}
