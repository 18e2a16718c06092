use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    services::csv_import::{
        self, bulk_import, is_ready, map_columns, preview::Preview, ColumnMapping, ImportResult,
        ParsedUpload, RawRow, TargetField,
    },
    AppState,
};

/// Import routes. Uploads larger than `max_upload_bytes` are rejected.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts/import/parse", post(parse_csv))
        .route("/contacts/import/parse-xlsx", post(parse_xlsx))
        .route("/contacts/import/mapping", post(update_mapping))
        .route("/contacts/import/preview", post(preview_import))
        .route("/contacts/import", post(import_contacts))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    headers: Vec<String>,
    #[serde(default)]
    mapping: ColumnMapping,
    column: String,
    /// `null` or absent skips the column.
    #[serde(default)]
    field: Option<TargetField>,
}

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    mapping: ColumnMapping,
    ready: bool,
    missing: Vec<TargetField>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    rows: Vec<RawRow>,
    mapping: ColumnMapping,
}

async fn parse_csv(body: String) -> Result<Json<ParsedUpload>, AppError> {
    Ok(Json(csv_import::parse(&body)?))
}

async fn parse_xlsx(body: Bytes) -> Result<Json<ParsedUpload>, AppError> {
    tracing::info!("Received workbook upload of {} bytes", body.len());
    Ok(Json(csv_import::parse_workbook(body)?))
}

async fn update_mapping(
    Json(request): Json<MappingRequest>,
) -> Result<Json<MappingResponse>, AppError> {
    let mapping = map_columns(
        &request.headers,
        &request.mapping,
        &request.column,
        request.field,
    )?;
    Ok(Json(MappingResponse {
        ready: is_ready(&mapping),
        missing: mapping.missing_required(),
        mapping,
    }))
}

async fn preview_import(Json(request): Json<ImportRequest>) -> Result<Json<Preview>, AppError> {
    Ok(Json(csv_import::preview(&request.rows, &request.mapping)?))
}

async fn import_contacts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResult>, AppError> {
    let result = bulk_import(&state.store.contacts, &request.rows, &request.mapping).await?;
    Ok(Json(result))
}
