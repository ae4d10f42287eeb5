use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{catalog_stats, import_bulk_data, list_bulk_data};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_bulk_data))
        .route("/bulk-data", get(list_bulk_data))
        .route("/stats", get(catalog_stats))
}
