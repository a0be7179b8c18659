//! TerraSync mock backend server

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terrasync_server::config::Config;
use terrasync_server::handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terrasync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting TerraSync server");
    tracing::info!("CORS origins: {:?}", config.allowed_origins);
    if config.rate_limit_requests > 0 {
        tracing::info!(
            "Rate limit: {} requests / {}s",
            config.rate_limit_requests,
            config.rate_limit_period_seconds
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = terrasync_server::router(AppState::new(config));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
