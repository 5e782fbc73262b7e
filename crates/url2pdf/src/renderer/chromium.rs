// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Every context launches its own browser process with a throwaway profile
//! directory, so renders never share cookies, cache or storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{NavigationResult, RenderContext, Renderer};
use crate::error::{Error, Result};
use crate::types::RenderOptions;

/// Environment variable pointing at a Chrome/Chromium executable.
pub const CHROME_PATH_ENV: &str = "URL2PDF_CHROME_PATH";

/// How long a closing browser gets to exit before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. URL2PDF_CHROME_PATH env
    if let Ok(p) = std::env::var(CHROME_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
        warn!("{CHROME_PATH_ENV} points at missing file {p}");
    }

    // 2. System PATH
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
#[derive(Debug)]
pub struct ChromiumRenderer {
    executable: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer using `executable`, or discover one when `None`.
    ///
    /// No browser is started until the first context is requested.
    pub fn new(executable: Option<PathBuf>) -> Result<Self> {
        let executable = match executable {
            Some(path) if path.exists() => path,
            Some(path) => {
                return Err(Error::BrowserUnavailable(format!(
                    "Chromium executable not found at {}",
                    path.display()
                )))
            }
            None => find_chromium().ok_or_else(|| {
                Error::BrowserUnavailable(format!(
                    "Chromium not found. Install google-chrome or chromium, or set {CHROME_PATH_ENV}."
                ))
            })?,
        };

        Ok(Self {
            executable,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let profile_dir = std::env::temp_dir().join(format!("url2pdf-{}", Uuid::new_v4()));

        let config = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .user_data_dir(&profile_dir)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--hide-scrollbars")
            .build()
            .map_err(|e| Error::BrowserUnavailable(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::BrowserUnavailable(format!("failed to launch Chromium: {e}")))?;

        // Spawn the handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(browser, handler_task, &profile_dir).await;
                return Err(Error::Render(format!("failed to create new page: {e}")));
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        debug!(profile = %profile_dir.display(), "browser session started");

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            handler_task,
            profile_dir,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// One browser process with a single page.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    profile_dir: PathBuf,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, options: &RenderOptions) -> Result<NavigationResult> {
        let start = Instant::now();
        let page = &self.page;

        let result = tokio::time::timeout(options.navigation_timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        })
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => Err(Error::Render(format!("navigation failed: {e}"))),
            Err(_) => Err(Error::Timeout {
                stage: "navigation",
                after: options.navigation_timeout,
            }),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| Error::Render(format!("JS execution failed: {e}")))?;

        result
            .into_value()
            .map_err(|e| Error::Render(format!("failed to convert JS result: {e:?}")))
    }

    async fn print_pdf(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        let params = PrintToPdfParams::builder()
            .print_background(options.print_background)
            .build();

        self.page
            .pdf(params)
            .await
            .map_err(|e| Error::Render(format!("print to PDF failed: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.active_count.fetch_sub(1, Ordering::Relaxed);
        if let Err(e) = this.page.close().await {
            debug!("page close failed: {e}");
        }
        shutdown(this.browser, this.handler_task, &this.profile_dir).await;
        Ok(())
    }
}

/// Close the browser, reap the process and remove its profile.
///
/// A browser that has not exited within [`SHUTDOWN_GRACE`] is killed.
async fn shutdown(mut browser: Browser, handler_task: JoinHandle<()>, profile_dir: &Path) {
    let graceful = tokio::time::timeout(SHUTDOWN_GRACE, async {
        if let Err(e) = browser.close().await {
            debug!("browser close failed: {e}");
        }
        browser.wait().await
    })
    .await;

    match graceful {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("failed to reap browser process: {e}"),
        Err(_) => {
            warn!(
                grace_ms = SHUTDOWN_GRACE.as_millis() as u64,
                "browser did not exit in time, killing it"
            );
            if let Some(Err(e)) = browser.kill().await {
                warn!("failed to kill browser process: {e}");
            }
        }
    }
    handler_task.abort();

    if let Err(e) = tokio::fs::remove_dir_all(profile_dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(profile = %profile_dir.display(), "failed to remove browser profile: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PageRenderer;

    #[test]
    fn test_missing_explicit_executable_is_unavailable() {
        let err = ChromiumRenderer::new(Some(PathBuf::from("/definitely/not/chrome"))).unwrap_err();
        assert!(matches!(err, Error::BrowserUnavailable(_)));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_renders_data_url() {
        let renderer = ChromiumRenderer::new(None).expect("failed to create renderer");
        let renderer: Arc<dyn Renderer> = Arc::new(renderer);
        let pages = PageRenderer::new(Arc::clone(&renderer), RenderOptions::default());

        let url = url::Url::parse("data:text/html,<h1>Hello</h1><p>World</p>").unwrap();
        let pdf = pages.render(&url).await.expect("render failed");

        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_execute_js() {
        let renderer = ChromiumRenderer::new(None).expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        ctx.navigate("data:text/html,<h1>Hello</h1>", &RenderOptions::default())
            .await
            .expect("navigation failed");

        let result = ctx
            .execute_js("document.querySelector('h1').textContent")
            .await
            .expect("JS execution failed");
        assert_eq!(result.as_str().unwrap(), "Hello");

        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
    }
}
