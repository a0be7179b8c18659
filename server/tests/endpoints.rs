use std::net::SocketAddr;

use serde_json::{json, Value};
use terrasync_client::{ClientError, ImageUpload, TerraSyncClient, TradeRequest};
use terrasync_server::config::Config;
use terrasync_server::handlers::AppState;

async fn spawn(config: Config) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = terrasync_server::router(AppState::new(config));
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{addr}")
}

async fn client() -> TerraSyncClient {
    let base = spawn(Config::default()).await;
    TerraSyncClient::with_http_client(reqwest::Client::new(), &base)
}

fn laptop_photo() -> ImageUpload {
    ImageUpload::new("laptop.jpg", "image/jpeg", b"\xff\xd8\xff\xe0 fake jpeg".to_vec())
}

#[tokio::test]
async fn analyze_then_trade_then_stats() {
    let client = client().await;

    let analysis = client.analyze_item(laptop_photo()).await.unwrap();
    assert!(analysis.item_id.starts_with("item-"));
    assert!(analysis.circular_value.confidence_in_range());
    assert_eq!(analysis.category, "electronics");
    assert!(!analysis.matching_organizations.is_empty());

    let request = TradeRequest::new(analysis.item_id.clone(), "user-demo")
        .preferred_path(analysis.recommended_paths[0].clone())
        .location(40.7128, -74.006);
    let trade = client.orchestrate_trade(&request).await.unwrap();
    assert_eq!(trade.status, "matched");
    assert!(trade.has_match());
    assert!(trade.best_match_is_listed());
    assert_eq!(trade.negotiation_steps.len(), 6);

    let stats = client.impact_stats().await.unwrap();
    assert_eq!(stats, client.impact_stats().await.unwrap());
    assert_eq!(stats.active_users, 12_847);
}

#[tokio::test]
async fn same_image_gets_same_item_id() {
    let client = client().await;
    let first = client.analyze_item(laptop_photo()).await.unwrap();
    let second = client.analyze_item(laptop_photo()).await.unwrap();
    assert_eq!(first.item_id, second.item_id);
}

#[tokio::test]
async fn dispose_trade_succeeds_without_best_match() {
    let client = client().await;
    let request = TradeRequest::new("item-abc", "user-demo").preferred_path("dispose");

    let trade = client.orchestrate_trade(&request).await.unwrap();

    assert!(trade.best_match.is_none());
    assert_eq!(trade.status, "pending");
    assert_eq!(trade.eco_credits_earned, 0);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let client = client().await;
    let upload = ImageUpload::new("notes.txt", "text/plain", b"hello".to_vec());

    let err = client.analyze_item(upload).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Analysis failed: 400 Bad Request");
}

#[tokio::test]
async fn non_image_upload_reports_detail() {
    let base = spawn(Config::default()).await;
    let part = reqwest::multipart::Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/analyze-item"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "File must be an image");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let base = spawn(Config::default()).await;
    let form = reqwest::multipart::Form::new().text("note", "no file here");

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/analyze-item"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "No file uploaded");
}

#[tokio::test]
async fn blank_item_id_returns_failure_envelope_with_500() {
    let base = spawn(Config::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/orchestrate-trade"))
        .json(&json!({"item_id": "", "user_id": "user-demo"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains("item_id"));

    // The client reports the HTTP failure and does not read the envelope.
    let client = TerraSyncClient::with_http_client(reqwest::Client::new(), &base);
    let err = client
        .orchestrate_trade(&TradeRequest::new("", "user-demo"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 500, .. }));
    assert_eq!(err.to_string(), "Trade orchestration failed: Internal Server Error");
}

#[tokio::test]
async fn trade_body_missing_fields_is_a_validation_error() {
    let base = spawn(Config::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/orchestrate-trade"))
        .json(&json!({"user_id": "u"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Validation error");
    assert_eq!(body["errors"][0]["field"], "body");
    assert_eq!(body["errors"][0]["type"], "value_error");
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("item_id"));
}

#[tokio::test]
async fn malformed_trade_json_is_a_validation_error() {
    let base = spawn(Config::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/orchestrate-trade"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Validation error");
    assert_eq!(body["errors"][0]["type"], "json_invalid");
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let config = Config {
        max_upload_mb: 1,
        ..Config::default()
    };
    let base = spawn(config).await;
    let part = reqwest::multipart::Part::bytes(vec![0u8; 2 * 1024 * 1024])
        .file_name("huge.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/analyze-item"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 413);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "File too large. Maximum size is 1 MB");
}

#[tokio::test]
async fn non_multipart_upload_reports_detail() {
    let base = spawn(Config::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/analyze-item"))
        .json(&json!({"file": "laptop.jpg"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("Upload error"));
}

#[tokio::test]
async fn impact_stats_body_is_not_enveloped() {
    let base = spawn(Config::default()).await;

    let body: Value = reqwest::get(format!("{base}/api/impact-stats"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body.get("success").is_none());
    assert_eq!(body["items_processed"], 45_231);
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let config = Config {
        rate_limit_requests: 2,
        ..Config::default()
    };
    let base = spawn(config).await;
    let http = reqwest::Client::new();
    let url = format!("{base}/api/impact-stats");

    let first = http.get(&url).send().await.unwrap();
    assert_eq!(first.headers()["X-RateLimit-Limit"], "2");
    assert_eq!(first.headers()["X-RateLimit-Remaining"], "1");
    assert!(http.get(&url).send().await.unwrap().status().is_success());

    let limited = http.get(&url).send().await.unwrap();
    assert_eq!(limited.status(), 429);
    assert_eq!(limited.headers()["Retry-After"], "60");
    assert_eq!(limited.headers()["X-RateLimit-Remaining"], "0");

    // A different API key gets its own window.
    let keyed = http.get(&url).header("X-API-Key", "partner").send().await.unwrap();
    assert!(keyed.status().is_success());

    // Health checks are never limited.
    let health = http.get(format!("{base}/health")).send().await.unwrap();
    assert!(health.status().is_success());
}

#[tokio::test]
async fn rate_limit_surfaces_as_retryable_client_error() {
    let config = Config {
        rate_limit_requests: 1,
        ..Config::default()
    };
    let base = spawn(config).await;
    let client = TerraSyncClient::with_http_client(reqwest::Client::new(), &base);

    client.impact_stats().await.unwrap();
    let err = client.impact_stats().await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "Failed to fetch impact stats: Too Many Requests");
}

#[tokio::test]
async fn health_and_index() {
    let base = spawn(Config::default()).await;

    let health: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let index: Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();
    assert_eq!(index["endpoints"]["orchestrate_trade"], "/api/orchestrate-trade");
}
