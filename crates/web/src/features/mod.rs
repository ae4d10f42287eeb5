pub mod card_instances;
pub mod imports;
pub mod scryfall;

use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/scryfall", scryfall::routes::routes())
        .nest("/api/card-instances", card_instances::routes::routes())
        .merge(imports::routes::routes())
}
