//! Transactional access to the card catalog used by the importers.
//!
//! A [`CatalogStore`] hands out [`CatalogTransaction`]s; every write an import
//! performs goes through one transaction that is committed or rolled back as a
//! whole. Savepoints give callers a nested boundary for per-row recovery.

mod memory;
mod postgres;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{CardData, CatalogStats, NewCardInstance, PrintingKey};

#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>>;

    async fn collection_exists(&self, collection_id: Uuid) -> Result<bool>;

    async fn catalog_stats(&self) -> Result<CatalogStats>;
}

#[async_trait::async_trait]
pub trait CatalogTransaction: Send {
    async fn find_card_by_scryfall_id(&mut self, scryfall_id: &str) -> Result<Option<Uuid>>;

    async fn find_card_by_printing(&mut self, key: &PrintingKey) -> Result<Option<Uuid>>;

    async fn insert_card(&mut self, card: &CardData) -> Result<Uuid>;

    /// Overwrites every column of an existing card.
    async fn update_card(&mut self, card_id: Uuid, card: &CardData) -> Result<()>;

    async fn insert_card_instance(&mut self, instance: &NewCardInstance) -> Result<Uuid>;

    /// Opens a single-level savepoint. A second call before release/rollback
    /// replaces the first.
    async fn savepoint(&mut self) -> Result<()>;

    async fn release_savepoint(&mut self) -> Result<()>;

    async fn rollback_to_savepoint(&mut self) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
