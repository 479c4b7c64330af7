//! fitradar - fashion release radar service binary

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fitradar::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting fitradar");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Memory server: {}", config.memory_server_url);
    info!("Feeds: {}", config.feeds.len());

    let bind_addr = config.bind_addr.clone();
    let state = AppState::from_config(config)?;

    // Background polling loop; runs until shutdown
    state.poller.clone().start().await;

    let poller = state.poller.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // A cycle already inside a network call finishes; no new cycle starts
    poller.stop().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
