use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use importer::sources::moxfield::MAX_FILE_SIZE_BYTES;

use super::handlers::{import_moxfield, list_formats};
use crate::state::AppState;

/// Room for multipart framing around a maximum-size upload.
const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE_BYTES + 64 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/collections/:id/import/moxfield",
            post(import_moxfield).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/import/formats", get(list_formats))
}
