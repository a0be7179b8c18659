//! HTTP handlers for the TerraSync API

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection}, FromRequest, Multipart, State,
    },
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use terrasync_client::models::{
    AnalyzeItemResponse, ImpactStats, OrchestrateTradeResponse, TradeRequest,
};

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::RateLimiter;
use crate::models::{ApiIndex, Endpoints, HealthResponse};
use crate::services::{analysis, impact, negotiation};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_period_seconds),
        );
        Self {
            config: Arc::new(config),
            limiter: Arc::new(limiter),
        }
    }
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "terrasync-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn index() -> Json<ApiIndex> {
    Json(ApiIndex {
        message: "Welcome to TerraSync API".to_string(),
        endpoints: Endpoints {
            analyze_item: "/api/analyze-item".to_string(),
            orchestrate_trade: "/api/orchestrate-trade".to_string(),
            impact_stats: "/api/impact-stats".to_string(),
        },
    })
}

/// JSON body extractor whose rejections render as `AppError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

struct UploadedImage {
    file_name: String,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of the form, rejecting non-image media types
/// before reading the body.
async fn extract_image(
    multipart: &mut Multipart,
    max_upload_mb: usize,
) -> Result<UploadedImage, AppError> {
    let upload_error = |e: MultipartError| AppError::upload(e, max_upload_mb);

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default();
        if !content_type.starts_with("image/") {
            tracing::debug!(content_type = %content_type, "Rejected non-image upload");
            return Err(AppError::NotAnImage);
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(upload_error)?;
        tracing::debug!(file_name = %file_name, size = bytes.len(), "Received upload");
        return Ok(UploadedImage {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::MissingFile)
}

/// Analyze an uploaded item image
pub async fn analyze_item(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeItemResponse>, AppError> {
    let mut multipart = multipart?;
    let image = extract_image(&mut multipart, state.config.max_upload_mb).await?;
    let analysis = analysis::analyze(&image.file_name, &image.bytes);

    tracing::info!(
        item_id = %analysis.item_id,
        category = %analysis.category,
        confidence = analysis.circular_value.confidence_score,
        "Item analyzed"
    );

    Ok(Json(AnalyzeItemResponse {
        success: true,
        analysis: Some(analysis),
        error: None,
    }))
}

/// Negotiate a trade for an analyzed item
pub async fn orchestrate_trade(
    ValidJson(request): ValidJson<TradeRequest>,
) -> Result<Json<OrchestrateTradeResponse>, AppError> {
    let trade = negotiation::orchestrate(&request, Utc::now())?;
    let body = OrchestrateTradeResponse::succeeded(&trade)
        .map_err(|e| AppError::Internal(format!("serialize trade: {e}")))?;
    Ok(Json(body))
}

/// Aggregate impact counters. Returned bare, without a success envelope.
pub async fn impact_stats() -> Json<ImpactStats> {
    Json(impact::snapshot())
}
