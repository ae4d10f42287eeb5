use axum::{Router, routing::put};

use super::handlers::{move_to_deck, remove_from_deck};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:id/move-to-deck/:deck_id", put(move_to_deck))
        .route("/:id/remove-from-deck", put(remove_from_deck))
}
