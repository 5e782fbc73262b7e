// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide), and
//! [`PageRenderer`], which drives one context through navigate, settle,
//! image wait and print.

pub mod chromium;
pub mod settle;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::types::RenderOptions;

/// Leading bytes of every PDF document.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start an isolated browser session.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Number of currently open contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser session used for one render.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, options: &RenderOptions) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Print the current page and return the decoded PDF bytes.
    async fn print_pdf(&self, options: &RenderOptions) -> Result<Vec<u8>>;
    /// Release the session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Renders URLs to PDF bytes, one fresh context per call.
#[derive(Clone)]
pub struct PageRenderer {
    renderer: Arc<dyn Renderer>,
    options: RenderOptions,
}

impl PageRenderer {
    pub fn new(renderer: Arc<dyn Renderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    pub fn active_contexts(&self) -> usize {
        self.renderer.active_contexts()
    }

    /// Render `url` to PDF bytes.
    ///
    /// The context is closed on every path out of this function, including
    /// deadline expiry. Closing is itself bounded by `close_timeout`, so a
    /// call never outlives `deadline + close_timeout`.
    pub async fn render(&self, url: &Url) -> Result<Vec<u8>> {
        let started = Instant::now();
        let mut ctx = self.renderer.new_context().await?;

        let outcome = tokio::time::timeout(
            self.options.deadline,
            drive(ctx.as_mut(), url, &self.options),
        )
        .await;

        match tokio::time::timeout(self.options.close_timeout, ctx.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(url = %url, "failed to release browser session: {e}"),
            Err(_) => warn!(
                url = %url,
                timeout_ms = self.options.close_timeout.as_millis() as u64,
                "browser session did not close in time, abandoning it"
            ),
        }

        let pdf = match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Timeout {
                    stage: "render",
                    after: self.options.deadline,
                })
            }
        };

        info!(
            url = %url,
            bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "page rendered"
        );
        Ok(pdf)
    }
}

async fn drive(ctx: &mut dyn RenderContext, url: &Url, options: &RenderOptions) -> Result<Vec<u8>> {
    let nav = ctx.navigate(url.as_str(), options).await?;
    debug!(final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "navigation complete");

    settle::scroll_until_stable(&*ctx, options).await?;
    settle::wait_for_images(&*ctx, options).await?;

    let pdf = ctx.print_pdf(options).await?;
    if !pdf.starts_with(PDF_MAGIC) {
        return Err(Error::Render(format!(
            "print returned {} bytes without a PDF header",
            pdf.len()
        )));
    }
    Ok(pdf)
}

/// A renderer used when no browser is available.
///
/// Every render fails with [`Error::BrowserUnavailable`]; the rest of the
/// service (registry, archive, static files) keeps working.
pub struct NoopRenderer {
    reason: String,
}

impl NoopRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(Error::BrowserUnavailable(self.reason.clone()))
    }

    fn active_contexts(&self) -> usize {
        0
    }
}
