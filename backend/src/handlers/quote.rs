//! Quote HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Quote, SaveOutcome};
use validator::Validate;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusInput {
    #[validate(length(min = 1, max = 100))]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: SaveOutcome,
}

/// Load a quote with its options and items
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
) -> impl IntoResponse {
    match state.quotes.load_quote(&quote_id).await {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create or update a quote and all of its options
pub async fn save_quote(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> impl IntoResponse {
    match state.quotes.save_quote(&quote).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SaveResponse {
                success: true,
                outcome,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::validation("status", &e.to_string(), "סטטוס לא תקין").into_response();
    }

    match state.quotes.update_status(&quote_id, &input.status).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "status": input.status })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Re-derive every option of the posted quote
pub async fn recalculate_quote(Json(mut quote): Json<Quote>) -> impl IntoResponse {
    shared::invalidate(&mut quote);
    let report = shared::recalculate(&mut quote);
    tracing::debug!(recomputed = report.recomputed, "Recalculated quote");
    (StatusCode::OK, Json(quote))
}
