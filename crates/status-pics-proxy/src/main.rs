//! Status Pics Proxy - cached HTTP status code images
//!
//! Serves `/<code>` from a local cache directory, falling back to a remote
//! http.cat-style service on miss. PUT and DELETE manage entries directly.

mod config;
mod error;
mod fetcher;
mod server;

use crate::config::Cli;
use crate::error::{ProxyError, Result};
use crate::fetcher::ImageFetcher;
use crate::server::{start_server, ServerState, SharedState};
use clap::Parser;
use file_image_cache::ImageCache;
use http_cat_client::HttpCatClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("status_pics_proxy=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Status Pics Proxy...");
    info!("Host: {}", config.host);
    info!("Port: {}", config.port);
    info!("Image source: {}", config.source_url);

    // Create cache and remote source
    let cache = ImageCache::new(config.cache_dir.clone());
    cache.init().await?;
    info!("Cache dir: {:?}", cache.cache_dir());

    let source = HttpCatClient::with_base_url(&config.source_url, config.source_timeout)?;

    // Create shared state
    let fetcher = ImageFetcher::new(cache, Arc::new(source));
    let state: SharedState = Arc::new(ServerState::new(fetcher, config.max_body_bytes));

    // Start HTTP server (blocking)
    start_server(state, &config.host, config.port)
        .await
        .map_err(|e| ProxyError::Config(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}
