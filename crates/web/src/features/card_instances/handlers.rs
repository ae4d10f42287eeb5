use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::services;
use crate::error::WebResult;
use crate::state::AppState;

pub async fn move_to_deck(
    State(state): State<AppState>,
    Path((id, deck_id)): Path<(Uuid, Uuid)>,
) -> WebResult<Response> {
    let instance = services::move_to_deck(state.db.pool(), id, deck_id).await?;

    Ok(Json(instance).into_response())
}

pub async fn remove_from_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<Response> {
    let instance = services::remove_from_deck(state.db.pool(), id).await?;

    Ok(Json(instance).into_response())
}
