use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use importer::MoxfieldImporter;
use importer::sources::moxfield::{self, MAX_FILE_SIZE_BYTES};
use serde_json::json;
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::state::AppState;

const CSV_FIELD: &str = "csv_file";

pub async fn import_moxfield(
    State(state): State<AppState>,
    Path(collection_id): Path<Uuid>,
    multipart: Multipart,
) -> WebResult<Response> {
    let content = read_csv_upload(multipart).await?;
    moxfield::validate_header(&content)?;

    let stats = MoxfieldImporter::new()
        .import(&content, collection_id, &state.import_context)
        .await?;

    Ok(Json(json!({
        "message": "Moxfield import completed",
        "stats": stats
    }))
    .into_response())
}

pub async fn list_formats() -> Json<serde_json::Value> {
    Json(json!({
        "formats": moxfield::supported_formats()
    }))
}

async fn read_csv_upload(mut multipart: Multipart) -> WebResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(CSV_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::BadRequest(e.to_string()))?;
        if bytes.len() > MAX_FILE_SIZE_BYTES {
            return Err(WebError::BadRequest(
                "CSV file must not exceed 10MB".to_string(),
            ));
        }
        return String::from_utf8(bytes.to_vec())
            .map_err(|_| WebError::BadRequest("CSV file must be UTF-8 encoded".to_string()));
    }

    Err(WebError::BadRequest(format!("{} is required", CSV_FIELD)))
}
