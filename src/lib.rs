pub mod api;
pub mod cli;
pub mod core;
pub mod history;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Bind address overrides taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

/// Builds the router for `config`, wired to the Yahoo Finance provider.
pub fn build_app(config: &AppConfig) -> Result<axum::Router> {
    let fetcher = providers::YahooSeriesFetcher::new(config.yahoo_base_url())
        .context("Failed to create HTTP client")?;
    let assembler = history::HistoryAssembler::new(Arc::new(fetcher));
    Ok(api::create_router(assembler, Some(&config.frontend_dir)))
}

pub async fn serve(config_path: Option<&str>, options: ServeOptions) -> Result<()> {
    info!("dipdca starting...");

    let mut config = load_config(config_path)?;
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    debug!("Loaded config: {config:#?}");

    let app = build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address: {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Registering routes:");
    info!("  GET /health");
    info!("  GET /api/prices/{{asset}}?years=1&currency=usd");
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
