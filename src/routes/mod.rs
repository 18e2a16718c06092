use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod activities;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod export;
pub mod import;
pub mod profile;
pub mod tasks;

pub fn routes(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .merge(contacts::routes())
        .merge(import::routes(state.config.max_upload_bytes))
        .merge(export::routes())
        .merge(deals::routes())
        .merge(tasks::routes())
        .merge(activities::routes())
        .merge(profile::routes())
        .merge(dashboard::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::{Config, LatencyProfile};
    use crate::services::store::CrmStore;
    use crate::AppState;

    pub fn state() -> Arc<AppState> {
        let config = Config {
            latency: LatencyProfile::none(),
            ..Config::default()
        };
        let store = CrmStore::new(config.latency);
        Arc::new(AppState::new(config, store))
    }
}
