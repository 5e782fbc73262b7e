// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use url2pdf::{ChromiumRenderer, NoopRenderer, PageRenderer, PdfStore, Renderer, UrlRegistry};

use crate::config::{ServerConfig, STATIC_MOUNT};

pub struct AppState {
    pub started_at: Instant,
    pub pages: PageRenderer,
    pub store: PdfStore,
    pub registry: UrlRegistry,
}

impl AppState {
    pub fn new(pages: PageRenderer, store: PdfStore) -> Self {
        Self {
            started_at: Instant::now(),
            pages,
            store,
            registry: UrlRegistry::new(),
        }
    }

    /// Open the store and pick a renderer for `config`.
    ///
    /// A missing browser is not fatal: the server starts with a renderer
    /// that fails every render, and the other endpoints keep working.
    pub async fn from_config(config: &ServerConfig) -> url2pdf::Result<Self> {
        let store = PdfStore::open(&config.static_dir, STATIC_MOUNT).await?;
        info!(path = %store.root().display(), "static directory ready");

        let renderer: Arc<dyn Renderer> = match ChromiumRenderer::new(config.chrome_path.clone()) {
            Ok(renderer) => {
                info!(chrome = %renderer.executable().display(), "Chromium renderer initialized");
                Arc::new(renderer)
            }
            Err(e) => {
                warn!("Failed to initialize Chromium: {e}");
                warn!("PDF generation disabled until a browser is installed");
                let reason = match e {
                    url2pdf::Error::BrowserUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                Arc::new(NoopRenderer::new(reason))
            }
        };

        Ok(Self::new(
            PageRenderer::new(renderer, config.render.clone()),
            store,
        ))
    }
}
