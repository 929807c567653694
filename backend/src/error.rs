//! Error handling for the Quote Builder server
//!
//! Provides consistent error responses in English and Hebrew

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::SaveOutcome;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_he: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Save already in progress for quote {0}")]
    SaveInProgress(String),

    // Record store errors
    #[error("Record store error ({status}): {message}")]
    RecordStore { status: u16, message: String },

    #[error("Record store request timed out")]
    UpstreamTimeout,

    /// A save that failed after some records were already created
    #[error("Save stopped partway: {message}")]
    PartialSave { saved: SaveOutcome, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str, message_he: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_he: message_he.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout
        } else {
            AppError::RecordStore {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_he: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Records already written by a save that stopped partway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SaveOutcome>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SaveInProgress(_) => StatusCode::CONFLICT,
            AppError::RecordStore { .. } | AppError::PartialSave { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Configuration(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            AppError::Validation { field, message, message_he } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_he: message_he.clone(),
                field: Some(field.clone()),
                saved: None,
            },
            AppError::ValidationError(msg) => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: msg.clone(),
                message_he: format!("נתונים לא תקינים: {}", msg),
                field: None,
                saved: None,
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_he: format!("{} לא נמצא", resource),
                field: None,
                saved: None,
            },
            AppError::SaveInProgress(quote) => ErrorDetail {
                code: "SAVE_IN_PROGRESS".to_string(),
                message_en: format!("Quote {} is already being saved", quote),
                message_he: format!("הצעת המחיר {} כבר בשמירה", quote),
                field: None,
                saved: None,
            },
            AppError::RecordStore { status, message } => ErrorDetail {
                code: "RECORD_STORE_ERROR".to_string(),
                message_en: format!("Record store error ({}): {}", status, message),
                message_he: "שגיאה בתקשורת עם בסיס הנתונים".to_string(),
                field: None,
                saved: None,
            },
            AppError::PartialSave { saved, message } => ErrorDetail {
                code: "PARTIAL_SAVE".to_string(),
                message_en: format!(
                    "Quote {} was saved partway: {}",
                    saved.quote_record_id, message
                ),
                message_he: "השמירה נעצרה באמצע, יש לשמור שוב".to_string(),
                field: None,
                saved: Some(saved.clone()),
            },
            AppError::UpstreamTimeout => ErrorDetail {
                code: "UPSTREAM_TIMEOUT".to_string(),
                message_en: "The record store did not respond in time".to_string(),
                message_he: "בסיס הנתונים לא הגיב בזמן".to_string(),
                field: None,
                saved: None,
            },
            AppError::Configuration(msg) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("Configuration error: {}", msg),
                message_he: format!("שגיאת הגדרות: {}", msg),
                field: None,
                saved: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: msg.clone(),
                message_he: "שגיאה פנימית בשרת".to_string(),
                field: None,
                saved: None,
            },
            AppError::InternalError(_) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: "An internal server error occurred".to_string(),
                message_he: "שגיאה פנימית בשרת".to_string(),
                field: None,
                saved: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_detail = self.detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
