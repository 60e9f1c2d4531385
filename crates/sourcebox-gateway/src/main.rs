//! SourceBox Gateway
//!
//! This is the main entry point for the gateway service. Configuration is
//! read from environment variables (see [`GatewayConfig::from_env`]).
//!
//! A background task sweeps idle sessions and deletes their scratch
//! directories.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sourcebox_auth::{AuthConfig, HttpAuthClient};
use sourcebox_gateway::{create_router, GatewayConfig, GatewayState};
use sourcebox_packs::HttpPackClient;

/// Interval between sweeps for idle sessions.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sourcebox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SourceBox Gateway");

    let config = GatewayConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        api_url = %config.api_url,
        workspace_dir = %config.workspace_dir.display(),
        signup_url = ?config.signup_url,
        s3_endpoint = ?config.s3_endpoint,
        unsupported_files = %config.unsupported_files,
        allow_local_repos = config.allow_local_repos,
        "Gateway configuration loaded"
    );

    let auth = Arc::new(HttpAuthClient::new(AuthConfig {
        timeout_seconds: config.http_timeout_seconds,
        ..AuthConfig::new(config.api_url.clone())
    })?);
    let packs = Arc::new(HttpPackClient::new(
        config.api_url.clone(),
        config.http_timeout_seconds,
    )?);
    tracing::info!("Remote API clients initialized");

    tokio::fs::create_dir_all(&config.workspace_dir).await?;

    let listen_addr = config.listen_addr.clone();
    let state = GatewayState::new(auth, packs, config)?;

    // Sweep idle sessions
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.reap_expired_sessions().await;
        }
    });

    let app = create_router(state);
    tracing::info!("Router configured with all endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
