//! Error types for the TerraSync server

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::TradeStatus;

/// One entry of the `errors` list in a validation response
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File must be an image")]
    NotAnImage,

    #[error("Upload error: {0}")]
    Multipart(MultipartError),

    #[error("Upload error: {0}")]
    InvalidForm(String),

    #[error("{0}")]
    TooLarge(String),

    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Rendered as the failure envelope of the trade endpoint.
    #[error("Trade orchestration failed: {0}")]
    TradeFailed(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited { retry_after: u64, limit: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify a multipart read failure. Bodies cut off by the upload limit
    /// become `TooLarge`.
    pub fn upload(err: MultipartError, max_upload_mb: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::TooLarge(format!(
                "File too large. Maximum size is {max_upload_mb} MB"
            ))
        } else {
            AppError::Multipart(err)
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return AppError::TooLarge("Request body too large".to_string());
            }
            _ => "body",
        };
        AppError::Validation(vec![FieldError {
            field: "body".to_string(),
            message: rejection.body_text(),
            kind,
        }])
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidForm(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::TradeFailed(_) => {
                let body = Json(json!({
                    "success": false,
                    "trade_id": "",
                    "status": TradeStatus::Failed.as_str(),
                    "negotiation_steps": [],
                    "matches": [],
                    "best_match": null,
                    "eco_credits_earned": 0,
                    "carbon_impact_kg": 0.0,
                    "error": self.to_string(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            AppError::RateLimited { retry_after, limit } => {
                let headers = [
                    ("Retry-After", retry_after.to_string()),
                    ("X-RateLimit-Limit", limit.to_string()),
                    ("X-RateLimit-Remaining", "0".to_string()),
                ];
                let body = Json(json!({
                    "detail": self.to_string(),
                    "retry_after": retry_after,
                }));
                (StatusCode::TOO_MANY_REQUESTS, headers, body).into_response()
            }
            AppError::Validation(errors) => {
                tracing::debug!(?errors, "Rejected request body");
                let body = Json(json!({
                    "detail": self.to_string(),
                    "errors": errors,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            _ => {
                let (status, detail) = match &self {
                    AppError::MissingFile
                    | AppError::NotAnImage
                    | AppError::Multipart(_)
                    | AppError::InvalidForm(_) => (StatusCode::BAD_REQUEST, self.to_string()),
                    AppError::TooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected error occurred. Please try again later.".to_string(),
                    ),
                };
                if status.is_server_error() {
                    tracing::error!(error = %self, "Unhandled error");
                }
                (status, Json(json!({ "detail": detail }))).into_response()
            }
        }
    }
}
