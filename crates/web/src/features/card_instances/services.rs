use sqlx::PgPool;
use storage::{
    error::Result, models::CardInstance, repository::card_instance::CardInstanceRepository,
};
use uuid::Uuid;

/// Assign a card instance to a deck
pub async fn move_to_deck(pool: &PgPool, id: Uuid, deck_id: Uuid) -> Result<CardInstance> {
    let repo = CardInstanceRepository::new(pool);
    repo.move_to_deck(id, deck_id).await
}

/// Return a card instance to its collection
pub async fn remove_from_deck(pool: &PgPool, id: Uuid) -> Result<CardInstance> {
    let repo = CardInstanceRepository::new(pool);
    repo.remove_from_deck(id).await
}
