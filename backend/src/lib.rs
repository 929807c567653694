//! Quote Builder backend
//!
//! HTTP surface over the quote persistence gateway and the catalog reads.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::AirtableClient;
use services::{CatalogService, QuoteGateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub quotes: Arc<QuoteGateway<AirtableClient>>,
    pub catalog: Arc<CatalogService<AirtableClient>>,
}

impl AppState {
    /// Build the record store client and the services sharing it
    pub fn new(config: Config) -> AppResult<Self> {
        let store = Arc::new(AirtableClient::new(&config.airtable)?);
        let tables = config.airtable.tables.clone();
        Ok(Self {
            quotes: Arc::new(QuoteGateway::new(store.clone(), tables.clone())),
            catalog: Arc::new(CatalogService::new(store, tables)),
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Quote Builder API v1.0"
}

/// Liveness endpoint
async fn health_check() -> &'static str {
    "OK"
}
