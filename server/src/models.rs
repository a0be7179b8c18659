//! Server-side response models
//!
//! Request/response bodies of the API endpoints are the shared wire models
//! in `terrasync_client::models`.

use serde::Serialize;

/// Lifecycle label reported in `TradeResult::status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Pending,
    Matched,
    Failed,
}

impl TradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Matched => "matched",
            TradeStatus::Failed => "failed",
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Root endpoint index
#[derive(Debug, Clone, Serialize)]
pub struct ApiIndex {
    pub message: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub analyze_item: String,
    pub orchestrate_trade: String,
    pub impact_stats: String,
}
