//! HTTP client for the TerraSync analysis, trade and impact endpoints
//!
//! Each call is a single independent attempt: no retry, no timeout beyond
//! the transport default, no caching and no cancellation.

use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    AnalysisResult, AnalyzeItemResponse, ImpactStats, OrchestrateTradeResponse, TradeRequest,
    TradeResult,
};
use crate::upload::ImageUpload;

pub const ANALYZE_ITEM_PATH: &str = "/api/analyze-item";
pub const ORCHESTRATE_TRADE_PATH: &str = "/api/orchestrate-trade";
pub const IMPACT_STATS_PATH: &str = "/api/impact-stats";

const ANALYSIS_FAILED: &str = "Analysis failed";
const TRADE_FAILED: &str = "Trade orchestration failed";
const STATS_FAILED: &str = "Failed to fetch impact stats";

#[derive(Clone, Debug)]
pub struct TerraSyncClient {
    http: Client,
    base_url: String,
}

impl TerraSyncClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(Client::new(), &config.base_url)
    }

    /// Use a caller-supplied transport, e.g. one pointed at a local server.
    pub fn with_http_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload an image for analysis.
    pub async fn analyze_item(&self, upload: ImageUpload) -> Result<AnalysisResult, ClientError> {
        let url = endpoint_url(&self.base_url, ANALYZE_ITEM_PATH);
        tracing::debug!(
            url = %url,
            file = %upload.file_name,
            content_type = %upload.content_type,
            size = upload.len(),
            "Submitting item for analysis"
        );

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| ClientError::InvalidUpload(format!("bad media type: {e}")))?;
        let form = multipart::Form::new().part("file", part);

        let resp = self.http.post(&url).multipart(form).send().await?;
        let status = resp.status();
        tracing::debug!(status = status.as_u16(), "Analysis response received");

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(body = %body, "Analysis error response");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("{ANALYSIS_FAILED}: {} {}", status.as_u16(), status_text(status)),
            });
        }

        let envelope: AnalyzeItemResponse = decode(resp).await?;
        if !envelope.success {
            return Err(ClientError::Application(server_message(
                envelope.error,
                ANALYSIS_FAILED,
            )));
        }

        let analysis = envelope
            .analysis
            .ok_or_else(|| ClientError::Decode("success envelope without analysis".into()))?;
        tracing::debug!(item_id = %analysis.item_id, category = %analysis.category, "Item analyzed");
        Ok(analysis)
    }

    /// Ask the backend to negotiate a trade for a previously analyzed item.
    pub async fn orchestrate_trade(
        &self,
        request: &TradeRequest,
    ) -> Result<TradeResult, ClientError> {
        let url = endpoint_url(&self.base_url, ORCHESTRATE_TRADE_PATH);
        tracing::debug!(url = %url, item_id = %request.item_id, "Orchestrating trade");

        let resp = self.http.post(&url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("{TRADE_FAILED}: {}", status_text(status)),
            });
        }

        let envelope: OrchestrateTradeResponse = decode(resp).await?;
        if !envelope.success {
            return Err(ClientError::Application(server_message(
                envelope.error,
                TRADE_FAILED,
            )));
        }

        let trade: TradeResult = serde_json::from_value(serde_json::Value::Object(envelope.trade))
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::debug!(
            trade_id = %trade.trade_id,
            status = %trade.status,
            matched = trade.has_match(),
            "Trade orchestrated"
        );
        Ok(trade)
    }

    /// Fetch the aggregate impact counters. This endpoint is not enveloped.
    pub async fn impact_stats(&self) -> Result<ImpactStats, ClientError> {
        let url = endpoint_url(&self.base_url, IMPACT_STATS_PATH);
        tracing::debug!(url = %url, "Fetching impact stats");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("{STATS_FAILED}: {}", status_text(status)),
            });
        }

        decode(resp).await
    }
}

/// Join `base` and `path`, collapsing repeated `/` after the scheme.
pub fn endpoint_url(base: &str, path: &str) -> String {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let (scheme, rest) = match joined.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, joined.as_str()),
    };

    let mut url = String::with_capacity(joined.len());
    if let Some(scheme) = scheme {
        url.push_str(scheme);
        url.push_str("://");
    }
    let mut prev_slash = false;
    for c in rest.chars() {
        let slash = c == '/';
        if !(slash && prev_slash) {
            url.push(c);
        }
        prev_slash = slash;
    }
    url
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

fn server_message(error: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}
