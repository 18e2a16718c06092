use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{Activity, ActivityForm},
    services::{
        dashboard::{activity_stats, ActivityStats},
        filters::{filter_activities, ActivityQuery},
        validation::validate_activity,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activities", get(list_activities).post(log_activity))
        .route("/activities/stats", get(stats))
        .route(
            "/activities/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
}

fn contact_id(form: &ActivityForm) -> Result<u64, AppError> {
    form.contact_id
        .ok_or_else(|| AppError::InvalidInput("Contact is required".to_string()))
}

async fn list_activities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Json<Vec<Activity>> {
    let activities = state.store.activities.get_all().await;
    let contacts = state.store.contacts.get_all().await;
    Json(filter_activities(activities, &contacts, &query, Utc::now()))
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<ActivityStats> {
    let activities = state.store.activities.get_all().await;
    Json(activity_stats(&activities, Utc::now()))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Activity>, AppError> {
    Ok(Json(state.store.activities.get_by_id(id).await?))
}

async fn log_activity(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ActivityForm>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    validate_activity(&form)?;
    let contact_id = contact_id(&form)?;
    let now = Utc::now();
    let activity = state
        .store
        .activities
        .create(|id| Activity {
            id,
            kind: form.kind,
            description: form.description.trim().to_string(),
            contact_id,
            deal_id: form.deal_id,
            timestamp: now,
        })
        .await;
    tracing::info!(
        "Logged {:?} activity {} for contact {}",
        activity.kind,
        activity.id,
        contact_id
    );
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<ActivityForm>,
) -> Result<Json<Activity>, AppError> {
    validate_activity(&form)?;
    let contact_id = contact_id(&form)?;
    let activity = state
        .store
        .activities
        .update(id, |activity| {
            activity.kind = form.kind;
            activity.description = form.description.trim().to_string();
            activity.contact_id = contact_id;
            activity.deal_id = form.deal_id;
        })
        .await?;
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.store.activities.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
