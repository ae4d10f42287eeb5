use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{CatalogStore, CatalogTransaction};
use crate::error::{Result, StorageError};
use crate::models::{CardData, CatalogStats, NewCardInstance, PrintingKey};

#[derive(Debug, Clone, Default)]
struct CatalogState {
    cards: BTreeMap<Uuid, CardData>,
    by_scryfall_id: HashMap<String, Uuid>,
    by_printing: HashMap<PrintingKey, Uuid>,
    collections: BTreeSet<Uuid>,
    instances: BTreeMap<Uuid, NewCardInstance>,
}

impl CatalogState {
    fn check_unique(&self, card_id: Option<Uuid>, card: &CardData) -> Result<()> {
        let taken = |owner: Option<&Uuid>| owner.is_some_and(|owner| Some(*owner) != card_id);

        if let Some(scryfall_id) = &card.scryfall_id {
            if taken(self.by_scryfall_id.get(scryfall_id)) {
                return Err(StorageError::ConstraintViolation(
                    "Card violates cards_scryfall_id_key".to_string(),
                ));
            }
        }
        if taken(self.by_printing.get(&card.printing_key())) {
            return Err(StorageError::ConstraintViolation(
                "Card violates cards_unique_printing".to_string(),
            ));
        }
        Ok(())
    }

    /// Stores `card` under `card_id`, keeping both lookup indexes in step.
    fn put_card(&mut self, card_id: Uuid, card: CardData) {
        if let Some(previous) = self.cards.remove(&card_id) {
            if let Some(scryfall_id) = &previous.scryfall_id {
                self.by_scryfall_id.remove(scryfall_id);
            }
            self.by_printing.remove(&previous.printing_key());
        }
        if let Some(scryfall_id) = &card.scryfall_id {
            self.by_scryfall_id.insert(scryfall_id.clone(), card_id);
        }
        self.by_printing.insert(card.printing_key(), card_id);
        self.cards.insert(card_id, card);
    }
}

/// In-process catalog with snapshot transactions.
///
/// `begin` copies the committed state; `commit` publishes the copy wholesale,
/// so concurrent transactions resolve as last writer wins. Used by tests and
/// dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Transaction("catalog store lock poisoned".to_string()))
    }

    pub fn add_collection(&self, collection_id: Uuid) -> Result<()> {
        self.lock()?.collections.insert(collection_id);
        Ok(())
    }

    pub fn card_count(&self) -> Result<usize> {
        Ok(self.lock()?.cards.len())
    }

    pub fn card_by_scryfall_id(&self, scryfall_id: &str) -> Result<Option<CardData>> {
        let state = self.lock()?;
        Ok(state
            .by_scryfall_id
            .get(scryfall_id)
            .and_then(|card_id| state.cards.get(card_id))
            .cloned())
    }

    pub fn instances_of(&self, card_id: Uuid) -> Result<Vec<NewCardInstance>> {
        Ok(self
            .lock()?
            .instances
            .values()
            .filter(|i| i.card_id == card_id)
            .cloned()
            .collect())
    }

    pub fn instance_count(&self) -> Result<usize> {
        Ok(self.lock()?.instances.len())
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>> {
        let working = self.lock()?.clone();
        Ok(Box::new(MemoryCatalogTransaction {
            store: self.clone(),
            working,
            savepoint: None,
        }))
    }

    async fn collection_exists(&self, collection_id: Uuid) -> Result<bool> {
        Ok(self.lock()?.collections.contains(&collection_id))
    }

    async fn catalog_stats(&self) -> Result<CatalogStats> {
        let state = self.lock()?;
        let total_cards = state.cards.len() as i64;
        let scryfall_cards = state
            .cards
            .values()
            .filter(|c| c.scryfall_id.is_some())
            .count() as i64;
        let sets: BTreeSet<&str> = state
            .cards
            .values()
            .filter_map(|c| c.set_code.as_deref())
            .collect();
        let latest_set = state
            .cards
            .values()
            .filter(|c| c.released_at.is_some())
            .max_by_key(|c| c.released_at)
            .and_then(|c| c.set_name.clone());

        let mut rarity_breakdown = BTreeMap::new();
        for rarity in state.cards.values().filter_map(|c| c.rarity.as_ref()) {
            *rarity_breakdown.entry(rarity.clone()).or_insert(0) += 1;
        }

        Ok(CatalogStats {
            total_cards,
            scryfall_cards,
            manual_cards: total_cards - scryfall_cards,
            sets_count: sets.len() as i64,
            latest_set,
            rarity_breakdown,
        })
    }
}

pub struct MemoryCatalogTransaction {
    store: MemoryCatalogStore,
    working: CatalogState,
    savepoint: Option<CatalogState>,
}

#[async_trait::async_trait]
impl CatalogTransaction for MemoryCatalogTransaction {
    async fn find_card_by_scryfall_id(&mut self, scryfall_id: &str) -> Result<Option<Uuid>> {
        Ok(self.working.by_scryfall_id.get(scryfall_id).copied())
    }

    async fn find_card_by_printing(&mut self, key: &PrintingKey) -> Result<Option<Uuid>> {
        Ok(self.working.by_printing.get(key).copied())
    }

    async fn insert_card(&mut self, card: &CardData) -> Result<Uuid> {
        self.working.check_unique(None, card)?;
        let card_id = Uuid::new_v4();
        self.working.put_card(card_id, card.clone());
        Ok(card_id)
    }

    async fn update_card(&mut self, card_id: Uuid, card: &CardData) -> Result<()> {
        if !self.working.cards.contains_key(&card_id) {
            return Err(StorageError::NotFound);
        }
        self.working.check_unique(Some(card_id), card)?;
        self.working.put_card(card_id, card.clone());
        Ok(())
    }

    async fn insert_card_instance(&mut self, instance: &NewCardInstance) -> Result<Uuid> {
        if !self.working.cards.contains_key(&instance.card_id)
            || !self.working.collections.contains(&instance.collection_id)
        {
            return Err(StorageError::ConstraintViolation(
                "Card instance references a missing card or collection".to_string(),
            ));
        }
        let card_instance_id = Uuid::new_v4();
        self.working
            .instances
            .insert(card_instance_id, instance.clone());
        Ok(card_instance_id)
    }

    async fn savepoint(&mut self) -> Result<()> {
        self.savepoint = Some(self.working.clone());
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<()> {
        self.savepoint
            .take()
            .map(|_| ())
            .ok_or_else(|| StorageError::Transaction("no active savepoint".to_string()))
    }

    async fn rollback_to_savepoint(&mut self) -> Result<()> {
        let snapshot = self
            .savepoint
            .take()
            .ok_or_else(|| StorageError::Transaction("no active savepoint".to_string()))?;
        self.working = snapshot;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        *this.store.lock()? = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(scryfall_id: &str, title: &str) -> CardData {
        CardData {
            title: title.to_string(),
            card_type: "Instant".to_string(),
            scryfall_id: Some(scryfall_id.to_string()),
            edition: Some("Alpha".to_string()),
            collector_number: Some(scryfall_id.to_string()),
            ..CardData::default()
        }
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_card(&card("a", "Lightning Bolt")).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.card_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_card(&card("a", "Lightning Bolt")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.card_count().unwrap(), 1);
        assert!(store.card_by_scryfall_id("a").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_printing_is_a_constraint_violation() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_card(&CardData::placeholder("Sol Ring", "C21", "263"))
            .await
            .unwrap();
        let err = tx
            .insert_card(&CardData::placeholder("Sol Ring", "C21", "263"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_savepoint_rollback_restores_row_state() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_card(&card("a", "Lightning Bolt")).await.unwrap();
        tx.savepoint().await.unwrap();
        tx.insert_card(&card("b", "Counterspell")).await.unwrap();
        tx.rollback_to_savepoint().await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.card_count().unwrap(), 1);
        assert!(store.card_by_scryfall_id("b").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_catalog_stats_split_imported_and_manual_cards() {
        let store = MemoryCatalogStore::new();
        let mut imported = card("a", "Lightning Bolt");
        imported.set_code = Some("lea".to_string());
        imported.rarity = Some("common".to_string());

        let mut tx = store.begin().await.unwrap();
        tx.insert_card(&imported).await.unwrap();
        tx.insert_card(&CardData::placeholder("Sol Ring", "C21", "263"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let stats = store.catalog_stats().await.unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.scryfall_cards, 1);
        assert_eq!(stats.manual_cards, 1);
        assert_eq!(stats.sets_count, 1);
        assert_eq!(stats.rarity_breakdown.get("common"), Some(&1));
    }

    #[tokio::test]
    async fn test_update_moves_lookup_keys() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        let card_id = tx.insert_card(&card("a", "Lightning Bolt")).await.unwrap();

        let mut renamed = card("a2", "Lightning Bolt");
        renamed.collector_number = Some("162".to_string());
        tx.update_card(card_id, &renamed).await.unwrap();

        assert_eq!(tx.find_card_by_scryfall_id("a").await.unwrap(), None);
        assert_eq!(tx.find_card_by_scryfall_id("a2").await.unwrap(), Some(card_id));
        assert_eq!(
            tx.find_card_by_printing(&PrintingKey::new("Lightning Bolt", "Alpha", "162"))
                .await
                .unwrap(),
            Some(card_id)
        );

        // The freed keys can be claimed by another card.
        tx.insert_card(&card("a", "Lightning Bolt")).await.unwrap();
    }

    #[tokio::test]
    async fn test_large_catalog_lookups_stay_indexed() {
        let store = MemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        for i in 0..50_000 {
            let id = format!("id-{}", i);
            assert_eq!(tx.find_card_by_scryfall_id(&id).await.unwrap(), None);
            tx.insert_card(&card(&id, &format!("Card {}", i))).await.unwrap();
        }
        tx.commit().await.unwrap();

        assert_eq!(store.card_count().unwrap(), 50_000);
        let found = store.card_by_scryfall_id("id-49999").unwrap().unwrap();
        assert_eq!(found.title, "Card 49999");
    }
}
