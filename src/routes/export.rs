use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::ContactStatus,
    services::{
        export::{contacts_to_csv, export_file_name, ExportField},
        filters::{filter_contacts, ContactQuery},
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/contacts/export", post(export_contacts))
}

/// Which columns to write and which contacts to include. Without `fields`
/// the default column set is used.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    fields: Option<Vec<ExportField>>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    status: Option<ContactStatus>,
}

async fn export_contacts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = request
        .fields
        .unwrap_or_else(|| ExportField::DEFAULT.to_vec());
    let query = ContactQuery {
        search: request.search,
        status: request.status,
    };
    let contacts = filter_contacts(state.store.contacts.get_all().await, &query);
    let csv = contacts_to_csv(&contacts, &fields)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
