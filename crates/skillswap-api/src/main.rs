// Campus Skill Swap API server
// Decision: Fall back to in-memory stores when DATABASE_URL is unset (dev mode)

use anyhow::{Context, Result};
use skillswap_api::{build_app, ApiConfig, AppServices};
use skillswap_storage::StorageBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillswap_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("skillswap-api starting...");

    let config = ApiConfig::from_env();

    let backend = match &config.database_url {
        Some(url) => {
            let backend = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            backend
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running with in-memory storage (dev mode)");
            StorageBackend::in_memory()
        }
    };

    tracing::info!(
        max_sessions_per_pair = config.engine.max_sessions_per_pair,
        require_feedback = config.engine.require_feedback_before_next_session,
        "Session engine configured"
    );

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let services = AppServices::new(&backend, config.engine.clone());
    let app = build_app(&services, &config.api_prefix, config.cors_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
