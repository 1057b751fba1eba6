mod api;
mod auth;
mod config;
mod error;
mod main_lib;

use std::sync::Arc;

use tower_http::services::{ServeDir, ServeFile};

use adboard_core::sync::SyncScheduler;

use api::app_router;
use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    let scheduler = Arc::new(SyncScheduler::new(
        Arc::clone(&state.orchestrator),
        Arc::clone(&state.settings_repository),
    ));
    let scheduler_handle = scheduler.spawn();

    let static_dir = std::path::PathBuf::from(&config.static_dir);
    let index_file = static_dir.join("index.html");
    let static_service = ServeDir::new(static_dir).fallback(ServeFile::new(index_file));
    let router = app_router(state).fallback_service(static_service);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Timer loop stops; an in-flight sync run is left to finish on its own.
    scheduler_handle.stop();
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
    }
}
