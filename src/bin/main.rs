//! Word-list sync server.
//!
//! Reads its configuration from the environment once, picks the storage
//! strategy and serves the sync and read endpoints until Ctrl-C.

use anyhow::Context;
use std::env;
use std::sync::Arc;
use tracing::info;
use wordlist_core::config::Config;
use wordlist_core::persistence::{Backend, WordStore};
use wordlist_core::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("loading configuration")?;
    info!(store = ?config.store, bind = %config.bind_addr, "Starting word-list sync server");

    let backend = Arc::new(
        Backend::from_config(&config.store, config.backend_timeout)
            .context("initializing storage backend")?,
    );
    info!(backend = backend.label(), "Storage backend ready");

    let state = AppState::new(backend, config.sync_secret.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
