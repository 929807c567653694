//! Route definitions for the quote builder API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/quotes", quote_routes())
        .nest("/catalog", catalog_routes())
}

/// Quote load, save and status routes
fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::save_quote))
        .route("/recalculate", post(handlers::recalculate_quote))
        .route("/:quote_id", get(handlers::get_quote))
        .route("/:quote_id/status", put(handlers::update_quote_status))
}

/// Read-only catalog routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handlers::list_products))
        .route("/packages", get(handlers::list_packages))
        .route("/catalogs", get(handlers::list_catalogs))
        .route(
            "/catalogs/:catalog_id/packages",
            get(handlers::list_catalog_packages),
        )
}
