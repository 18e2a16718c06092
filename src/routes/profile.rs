use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::AppError,
    models::{PasswordChange, PasswordChanged, Profile, ProfileForm},
    services::validation::validate_profile,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/:id", put(update_profile))
        .route("/profile/:id/password", put(change_password))
}

async fn get_profile(State(state): State<Arc<AppState>>) -> Json<Profile> {
    Json(state.store.profile.get_profile().await)
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<Profile>, AppError> {
    validate_profile(&form)?;
    Ok(Json(state.store.profile.update_profile(id, form).await?))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(change): Json<PasswordChange>,
) -> Result<Json<PasswordChanged>, AppError> {
    Ok(Json(state.store.profile.change_password(id, change).await?))
}
