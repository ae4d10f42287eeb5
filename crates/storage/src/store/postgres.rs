use std::collections::BTreeMap;
use std::sync::LazyLock;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{CatalogStore, CatalogTransaction};
use crate::error::{Result, StorageError};
use crate::models::{CardData, CatalogStats, NewCardInstance, PrintingKey};

const SAVEPOINT: &str = "catalog_row";

/// Column order shared by [`INSERT_CARD_SQL`], [`UPDATE_CARD_SQL`] and [`bind_card`].
const CARD_COLUMNS: &[&str] = &[
    "title",
    "image_url",
    "image",
    "description",
    "cost",
    "type",
    "subtype",
    "power",
    "toughness",
    "power_text",
    "toughness_text",
    "edition",
    "collector_number",
    "scryfall_id",
    "oracle_id",
    "multiverse_ids",
    "mtgo_id",
    "mtgo_foil_id",
    "arena_id",
    "tcgplayer_id",
    "tcgplayer_etched_id",
    "cardmarket_id",
    "mana_cost",
    "cmc",
    "oracle_text",
    "flavor_text",
    "type_line",
    "colors",
    "color_identity",
    "color_indicator",
    "keywords",
    "produced_mana",
    "loyalty",
    "defense",
    "hand_modifier",
    "life_modifier",
    "legalities",
    "edhrec_rank",
    "penny_rank",
    "set",
    "set_id",
    "set_name",
    "set_type",
    "rarity",
    "released_at",
    "lang",
    "image_uris",
    "layout",
    "highres_image",
    "image_status",
    "border_color",
    "frame",
    "frame_effects",
    "security_stamp",
    "watermark",
    "artist",
    "artist_ids",
    "illustration_id",
    "reserved",
    "foil",
    "nonfoil",
    "oversized",
    "promo",
    "reprint",
    "variation",
    "digital",
    "full_art",
    "textless",
    "booster",
    "story_spotlight",
    "game_changer",
    "finishes",
    "games",
    "promo_types",
    "prices",
    "purchase_uris",
    "related_uris",
    "variation_of",
    "card_back_id",
    "scryfall_uri",
    "uri",
    "rulings_uri",
    "prints_search_uri",
];

static INSERT_CARD_SQL: LazyLock<String> = LazyLock::new(|| {
    let columns = CARD_COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=CARD_COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO cards ({}) VALUES ({}) RETURNING card_id",
        columns, placeholders
    )
});

// $1 is the card id, card columns start at $2.
static UPDATE_CARD_SQL: LazyLock<String> = LazyLock::new(|| {
    let assignments = CARD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("\"{}\" = ${}", c, i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE cards SET {}, updated_at = CURRENT_TIMESTAMP WHERE card_id = $1",
        assignments
    )
});

fn bind_card<'q>(
    query: Query<'q, Postgres, PgArguments>,
    card: &'q CardData,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(&card.title)
        .bind(&card.image_url)
        .bind(&card.image)
        .bind(&card.description)
        .bind(&card.cost)
        .bind(&card.card_type)
        .bind(&card.subtype)
        .bind(card.power)
        .bind(card.toughness)
        .bind(&card.power_text)
        .bind(&card.toughness_text)
        .bind(&card.edition)
        .bind(&card.collector_number)
        .bind(&card.scryfall_id)
        .bind(&card.oracle_id)
        .bind(card.multiverse_ids.as_ref().map(Json))
        .bind(card.mtgo_id)
        .bind(card.mtgo_foil_id)
        .bind(card.arena_id)
        .bind(card.tcgplayer_id)
        .bind(card.tcgplayer_etched_id)
        .bind(card.cardmarket_id)
        .bind(&card.mana_cost)
        .bind(card.cmc)
        .bind(&card.oracle_text)
        .bind(&card.flavor_text)
        .bind(&card.type_line)
        .bind(card.colors.as_ref().map(Json))
        .bind(card.color_identity.as_ref().map(Json))
        .bind(card.color_indicator.as_ref().map(Json))
        .bind(card.keywords.as_ref().map(Json))
        .bind(card.produced_mana.as_ref().map(Json))
        .bind(&card.loyalty)
        .bind(&card.defense)
        .bind(&card.hand_modifier)
        .bind(&card.life_modifier)
        .bind(card.legalities.as_ref().map(Json))
        .bind(card.edhrec_rank)
        .bind(card.penny_rank)
        .bind(&card.set_code)
        .bind(&card.set_id)
        .bind(&card.set_name)
        .bind(&card.set_type)
        .bind(&card.rarity)
        .bind(card.released_at)
        .bind(&card.lang)
        .bind(card.image_uris.as_ref().map(Json))
        .bind(&card.layout)
        .bind(card.highres_image)
        .bind(&card.image_status)
        .bind(&card.border_color)
        .bind(&card.frame)
        .bind(card.frame_effects.as_ref().map(Json))
        .bind(&card.security_stamp)
        .bind(&card.watermark)
        .bind(&card.artist)
        .bind(card.artist_ids.as_ref().map(Json))
        .bind(&card.illustration_id)
        .bind(card.reserved)
        .bind(card.foil)
        .bind(card.nonfoil)
        .bind(card.oversized)
        .bind(card.promo)
        .bind(card.reprint)
        .bind(card.variation)
        .bind(card.digital)
        .bind(card.full_art)
        .bind(card.textless)
        .bind(card.booster)
        .bind(card.story_spotlight)
        .bind(card.game_changer)
        .bind(card.finishes.as_ref().map(Json))
        .bind(card.games.as_ref().map(Json))
        .bind(card.promo_types.as_ref().map(Json))
        .bind(card.prices.as_ref().map(Json))
        .bind(card.purchase_uris.as_ref().map(Json))
        .bind(card.related_uris.as_ref().map(Json))
        .bind(&card.variation_of)
        .bind(&card.card_back_id)
        .bind(&card.scryfall_uri)
        .bind(&card.uri)
        .bind(&card.rulings_uri)
        .bind(&card.prints_search_uri)
}

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCatalogTransaction { tx }))
    }

    async fn collection_exists(&self, collection_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM collections WHERE collection_id = $1)",
        )
        .bind(collection_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn catalog_stats(&self) -> Result<CatalogStats> {
        let (total_cards, scryfall_cards, sets_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)::bigint,
                COUNT(scryfall_id)::bigint,
                COUNT(DISTINCT "set")::bigint
            FROM cards
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let latest_set = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT set_name FROM cards
            WHERE released_at IS NOT NULL
            ORDER BY released_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .flatten();

        let rarities: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT rarity, COUNT(*)::bigint
            FROM cards
            WHERE rarity IS NOT NULL
            GROUP BY rarity
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogStats {
            total_cards,
            scryfall_cards,
            manual_cards: total_cards - scryfall_cards,
            sets_count,
            latest_set,
            rarity_breakdown: rarities.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }
}

pub struct PgCatalogTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl CatalogTransaction for PgCatalogTransaction {
    async fn find_card_by_scryfall_id(&mut self, scryfall_id: &str) -> Result<Option<Uuid>> {
        let card_id = sqlx::query_scalar("SELECT card_id FROM cards WHERE scryfall_id = $1")
            .bind(scryfall_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(card_id)
    }

    async fn find_card_by_printing(&mut self, key: &PrintingKey) -> Result<Option<Uuid>> {
        let card_id = sqlx::query_scalar(
            r#"
            SELECT card_id FROM cards
            WHERE title = $1
              AND edition IS NOT DISTINCT FROM $2
              AND collector_number IS NOT DISTINCT FROM $3
            LIMIT 1
            "#,
        )
        .bind(&key.title)
        .bind(&key.edition)
        .bind(&key.collector_number)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(card_id)
    }

    async fn insert_card(&mut self, card: &CardData) -> Result<Uuid> {
        let row = bind_card(sqlx::query(INSERT_CARD_SQL.as_str()), card)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StorageError::from_card_write)?;

        Ok(row.try_get("card_id")?)
    }

    async fn update_card(&mut self, card_id: Uuid, card: &CardData) -> Result<()> {
        let result = bind_card(sqlx::query(UPDATE_CARD_SQL.as_str()).bind(card_id), card)
            .execute(&mut *self.tx)
            .await
            .map_err(StorageError::from_card_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn insert_card_instance(&mut self, instance: &NewCardInstance) -> Result<Uuid> {
        let card_instance_id = sqlx::query_scalar(
            r#"
            INSERT INTO card_instances
                (card_id, collection_id, condition, foil, language, tags, purchase_price, "alter", proxy)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING card_instance_id
            "#,
        )
        .bind(instance.card_id)
        .bind(instance.collection_id)
        .bind(instance.condition.as_str())
        .bind(instance.foil)
        .bind(&instance.language)
        .bind(instance.tags.as_ref().map(Json))
        .bind(instance.purchase_price)
        .bind(instance.alter)
        .bind(instance.proxy)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StorageError::from_instance_write)?;

        Ok(card_instance_id)
    }

    async fn savepoint(&mut self) -> Result<()> {
        sqlx::query(&format!("SAVEPOINT {}", SAVEPOINT))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<()> {
        sqlx::query(&format!("RELEASE SAVEPOINT {}", SAVEPOINT))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<()> {
        sqlx::query(&format!("ROLLBACK TO SAVEPOINT {}", SAVEPOINT))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_binds_every_card_column() {
        let last = format!("${}", CARD_COLUMNS.len());
        assert!(INSERT_CARD_SQL.contains(&last));
        assert!(!INSERT_CARD_SQL.contains(&format!("${}", CARD_COLUMNS.len() + 1)));
        assert!(INSERT_CARD_SQL.contains("\"set\""));
    }

    #[test]
    fn test_update_sql_reserves_first_placeholder_for_id() {
        assert!(UPDATE_CARD_SQL.contains("\"title\" = $2"));
        assert!(UPDATE_CARD_SQL.ends_with("WHERE card_id = $1"));
        assert!(UPDATE_CARD_SQL.contains(&format!("${}", CARD_COLUMNS.len() + 1)));
    }
}
