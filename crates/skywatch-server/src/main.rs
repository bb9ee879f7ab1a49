//! Relay server entry point for SkyWatch.
//!
//! Loads configuration from the environment, builds the provider client
//! and the shared application state, and serves the HTTP + `WebSocket`
//! API until `Ctrl-C`.

use std::sync::Arc;

use skywatch_provider::AdsbClient;
use skywatch_server::{AppConfig, AppState, AuthSettings, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the
/// server fails to bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("skywatch starting");

    let config = AppConfig::from_env()?;
    info!(
        provider_host = %config.provider.api_host,
        bind = %format!("{}:{}", config.server.host, config.server.port),
        poll_interval_ms = config.tracker.poll_interval.as_millis(),
        "configuration loaded"
    );

    let client = AdsbClient::new(&config.provider)?;
    let state = AppState::new(
        Arc::new(client),
        AuthSettings {
            password: config.password,
            session_ttl: config.session_ttl,
            secure_cookie: config.secure_cookie,
        },
        &config.tracker,
    )?;

    start_server(&config.server, Arc::new(state)).await?;

    info!("skywatch stopped");
    Ok(())
}
