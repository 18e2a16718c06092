use anyhow::Result;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod models;
mod routes;
mod services;

use services::store::{CrmStore, SeedData};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::load_config()?;

    // Initialize logging
    logging::init_logging(&config.log_filter)?;

    // Seed the in-memory stores
    let store = match &config.seed_file {
        Some(path) => CrmStore::from_seed(SeedData::load(path)?, config.latency),
        None => CrmStore::new(config.latency),
    };

    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, store));
    let app = routes::routes(state);

    // Run it
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    pub config: config::Config,
    pub store: CrmStore,
}

impl AppState {
    fn new(config: config::Config, store: CrmStore) -> Self {
        Self { config, store }
    }
}
