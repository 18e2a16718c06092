use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{Deal, DealForm, StageChange},
    services::{
        dashboard::{pipeline_summary, PipelineSummary},
        validation::validate_deal,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deals", get(list_deals).post(create_deal))
        .route("/deals/pipeline", get(pipeline))
        .route(
            "/deals/:id",
            get(get_deal).put(update_deal).delete(delete_deal),
        )
        .route("/deals/:id/stage", put(change_stage))
}

async fn contact_exists(state: &AppState, form: &DealForm) -> bool {
    match form.contact_id {
        Some(id) => state.store.contacts.get_by_id(id).await.is_ok(),
        None => false,
    }
}

async fn list_deals(State(state): State<Arc<AppState>>) -> Json<Vec<Deal>> {
    Json(state.store.deals.get_all().await)
}

async fn pipeline(State(state): State<Arc<AppState>>) -> Json<PipelineSummary> {
    let deals = state.store.deals.get_all().await;
    Json(pipeline_summary(&deals))
}

async fn get_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Deal>, AppError> {
    Ok(Json(state.store.deals.get_by_id(id).await?))
}

async fn create_deal(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DealForm>,
) -> Result<(StatusCode, Json<Deal>), AppError> {
    validate_deal(&form, contact_exists(&state, &form).await)?;
    let now = Utc::now();
    let deal = state
        .store
        .deals
        .create(|id| Deal {
            id,
            title: form.title.trim().to_string(),
            value: form.value.unwrap_or_default(),
            stage: form.stage,
            contact_id: form.contact_id.unwrap_or_default(),
            probability: form.probability,
            expected_close_date: form.expected_close_date,
            created_at: now,
        })
        .await;
    tracing::info!("Created deal {} in stage {:?}", deal.id, deal.stage);
    Ok((StatusCode::CREATED, Json(deal)))
}

async fn update_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<DealForm>,
) -> Result<Json<Deal>, AppError> {
    validate_deal(&form, contact_exists(&state, &form).await)?;
    let deal = state
        .store
        .deals
        .update(id, |deal| {
            deal.title = form.title.trim().to_string();
            deal.value = form.value.unwrap_or_default();
            deal.stage = form.stage;
            deal.contact_id = form.contact_id.unwrap_or_default();
            deal.probability = form.probability;
            deal.expected_close_date = form.expected_close_date;
        })
        .await?;
    Ok(Json(deal))
}

/// Moves a deal between pipeline columns.
async fn change_stage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(change): Json<StageChange>,
) -> Result<Json<Deal>, AppError> {
    let deal = state
        .store
        .deals
        .update(id, |deal| deal.stage = change.stage)
        .await?;
    tracing::info!("Deal {} moved to {:?}", id, deal.stage);
    Ok(Json(deal))
}

async fn delete_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.store.deals.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
