//! Authorization chain demo server.
//!
//! Serves `/health` publicly and `/api/protected-resource/post` behind a chain of
//! Basic, Bearer and API key authentication, each configured from the environment.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the router and its authorization chain
//! 3. Start server on configured port

use authz_chain::{app, config};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let app = app::router(&config)
        // Add request tracing middleware for observability
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
