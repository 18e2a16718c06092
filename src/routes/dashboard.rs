use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::{
    services::dashboard::{build_dashboard, Dashboard},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Json<Dashboard> {
    let store = &state.store;
    let (contacts, deals, tasks, activities) = tokio::join!(
        store.contacts.get_all(),
        store.deals.get_all(),
        store.tasks.get_all(),
        store.activities.get_all(),
    );
    Json(build_dashboard(
        &contacts,
        &deals,
        &tasks,
        &activities,
        Utc::now().date_naive(),
    ))
}
