// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! url2pdf HTTP server. Submit URLs, render them to PDF, download the
//! results as a zip.
//!
//! This library crate exposes the router and state for integration testing;
//! the `url2pdf` binary wires them to a TCP listener.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Bind `config.addr` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(
        AppState::from_config(&config)
            .await
            .context("failed to initialize server state")?,
    );
    let app = api::router(state, api::cors_layer(config.allowed_origins.clone()));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("url2pdf v{} listening on http://{}", env!("CARGO_PKG_VERSION"), config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received shutdown signal");
}
