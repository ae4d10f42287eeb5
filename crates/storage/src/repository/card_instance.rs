use sqlx::{PgPool, postgres::PgExecutor};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{CardInstance, Collection, Deck};

const INSTANCE_COLUMNS: &str = r#"card_instance_id, card_id, collection_id, deck_id, condition, foil,
    language, tags, purchase_price, "alter", proxy, created_at"#;

pub struct CardInstanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CardInstanceRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find card instance by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<CardInstance> {
        let instance = sqlx::query_as::<_, CardInstance>(&format!(
            "SELECT {} FROM card_instances WHERE card_instance_id = $1",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(instance)
    }

    /// Assign an instance to a deck owned by the same user as its collection.
    ///
    /// The instance row is locked and the owner rows are share-locked until
    /// the update commits.
    pub async fn move_to_deck(&self, id: Uuid, deck_id: Uuid) -> Result<CardInstance> {
        let mut tx = self.pool.begin().await?;

        let instance = sqlx::query_as::<_, CardInstance>(&format!(
            "SELECT {} FROM card_instances WHERE card_instance_id = $1 FOR UPDATE",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let collection = sqlx::query_as::<_, Collection>(
            "SELECT collection_id, user_id, name, description, created_at
             FROM collections WHERE collection_id = $1 FOR SHARE",
        )
        .bind(instance.collection_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let deck = sqlx::query_as::<_, Deck>(
            "SELECT deck_id, user_id, name, description, format, created_at
             FROM decks WHERE deck_id = $1 FOR SHARE",
        )
        .bind(deck_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        ensure_same_owner(&collection, &deck)?;

        let moved = set_deck(&mut *tx, id, Some(deck_id)).await?;
        tx.commit().await?;

        Ok(moved)
    }

    /// Return an instance to its collection's available pool
    pub async fn remove_from_deck(&self, id: Uuid) -> Result<CardInstance> {
        set_deck(self.pool, id, None).await
    }
}

async fn set_deck<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    deck_id: Option<Uuid>,
) -> Result<CardInstance> {
    let instance = sqlx::query_as::<_, CardInstance>(&format!(
        r#"
        UPDATE card_instances
        SET deck_id = $2, updated_at = CURRENT_TIMESTAMP
        WHERE card_instance_id = $1
        RETURNING {}
        "#,
        INSTANCE_COLUMNS
    ))
    .bind(id)
    .bind(deck_id)
    .fetch_optional(executor)
    .await?
    .ok_or(StorageError::NotFound)?;

    Ok(instance)
}

fn ensure_same_owner(collection: &Collection, deck: &Deck) -> Result<()> {
    if collection.user_id != deck.user_id {
        return Err(StorageError::ConstraintViolation(
            "Deck and collection must belong to the same user".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(user_id: Uuid) -> Collection {
        Collection {
            collection_id: Uuid::new_v4(),
            user_id,
            name: "Binder".to_string(),
            description: None,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    fn deck(user_id: Uuid) -> Deck {
        Deck {
            deck_id: Uuid::new_v4(),
            user_id,
            name: "Mono Red".to_string(),
            description: None,
            format: Some("modern".to_string()),
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_same_owner_is_accepted() {
        let owner = Uuid::new_v4();
        assert!(ensure_same_owner(&collection(owner), &deck(owner)).is_ok());
    }

    #[test]
    fn test_foreign_deck_is_rejected() {
        let err = ensure_same_owner(&collection(Uuid::new_v4()), &deck(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    async fn user(pool: &PgPool, email: &str) -> Uuid {
        sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $1) RETURNING user_id")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn deck_for(pool: &PgPool, user_id: Uuid) -> Uuid {
        sqlx::query_scalar("INSERT INTO decks (user_id, name) VALUES ($1, 'Deck') RETURNING deck_id")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// An instance of a fresh card in a collection owned by `user_id`.
    async fn instance_for(pool: &PgPool, user_id: Uuid) -> Uuid {
        let collection_id: Uuid = sqlx::query_scalar(
            "INSERT INTO collections (user_id, name) VALUES ($1, 'Binder') RETURNING collection_id",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();
        let card_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO cards (title, "type") VALUES ('Sol Ring', 'Artifact') RETURNING card_id"#,
        )
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query_scalar(
            "INSERT INTO card_instances (card_id, collection_id) VALUES ($1, $2)
             RETURNING card_instance_id",
        )
        .bind(card_id)
        .bind(collection_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test]
    #[ignore] // Only run when Postgres is reachable through DATABASE_URL
    async fn test_move_and_remove_round_trip(pool: PgPool) {
        let owner = user(&pool, "owner@example.com").await;
        let instance_id = instance_for(&pool, owner).await;
        let deck_id = deck_for(&pool, owner).await;
        let repo = CardInstanceRepository::new(&pool);

        let moved = repo.move_to_deck(instance_id, deck_id).await.unwrap();
        assert_eq!(moved.deck_id, Some(deck_id));

        let removed = repo.remove_from_deck(instance_id).await.unwrap();
        assert_eq!(removed.deck_id, None);
    }

    #[sqlx::test]
    #[ignore] // Only run when Postgres is reachable through DATABASE_URL
    async fn test_foreign_deck_leaves_instance_untouched(pool: PgPool) {
        let owner = user(&pool, "owner@example.com").await;
        let stranger = user(&pool, "stranger@example.com").await;
        let instance_id = instance_for(&pool, owner).await;
        let deck_id = deck_for(&pool, stranger).await;
        let repo = CardInstanceRepository::new(&pool);

        let err = repo.move_to_deck(instance_id, deck_id).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let instance = repo.find_by_id(instance_id).await.unwrap();
        assert_eq!(instance.deck_id, None);

        // Row locks from the failed attempt are gone once it returns.
        let own_deck = deck_for(&pool, owner).await;
        let moved = repo.move_to_deck(instance_id, own_deck).await.unwrap();
        assert_eq!(moved.deck_id, Some(own_deck));
    }

    #[sqlx::test]
    #[ignore] // Only run when Postgres is reachable through DATABASE_URL
    async fn test_missing_deck_is_not_found(pool: PgPool) {
        let owner = user(&pool, "owner@example.com").await;
        let instance_id = instance_for(&pool, owner).await;
        let repo = CardInstanceRepository::new(&pool);

        let err = repo.move_to_deck(instance_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
