//! Catalog HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::ListResponse;

use crate::AppState;

pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.load_catalog_products().await {
        Ok(products) => (StatusCode::OK, Json(ListResponse::new(products))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Active packages with their products resolved
pub async fn list_packages(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.load_active_packages().await {
        Ok(packages) => (StatusCode::OK, Json(ListResponse::new(packages))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_catalogs(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.load_catalogs().await {
        Ok(catalogs) => (StatusCode::OK, Json(ListResponse::new(catalogs))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_catalog_packages(
    State(state): State<AppState>,
    Path(catalog_id): Path<String>,
) -> impl IntoResponse {
    match state.catalog.load_catalog_packages(&catalog_id).await {
        Ok(packages) => (StatusCode::OK, Json(ListResponse::new(packages))).into_response(),
        Err(e) => e.into_response(),
    }
}
