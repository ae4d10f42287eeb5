use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use super::services::{self, ScryfallImportRequest};
use crate::error::WebResult;
use crate::state::AppState;

pub async fn import_bulk_data(
    State(state): State<AppState>,
    Json(request): Json<ScryfallImportRequest>,
) -> WebResult<Response> {
    request.validate()?;

    tracing::info!("Scryfall import requested: {:?}", request.source());
    let stats =
        services::import_bulk_data(&state.scryfall, &state.import_context, &request).await?;

    Ok(Json(json!({
        "message": "Scryfall import completed",
        "data": stats
    }))
    .into_response())
}

pub async fn list_bulk_data(State(state): State<AppState>) -> WebResult<Response> {
    let entries = services::list_bulk_data(&state.scryfall).await?;

    Ok(Json(json!({
        "message": "Available bulk data",
        "data": entries
    }))
    .into_response())
}

pub async fn catalog_stats(State(state): State<AppState>) -> WebResult<Response> {
    let stats = services::catalog_stats(&state.import_context).await?;

    Ok(Json(json!({
        "message": "Card catalog statistics",
        "data": stats
    }))
    .into_response())
}
