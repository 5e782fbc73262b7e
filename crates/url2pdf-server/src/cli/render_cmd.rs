// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Render a single URL to a PDF file without starting the server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use url::Url;
use url2pdf::{validate_url, ChromiumRenderer, PageRenderer, RenderOptions};

/// Render `url` and write it to `output` (or a name derived from the host).
pub async fn run(
    url: &str,
    output: Option<PathBuf>,
    chrome_path: Option<PathBuf>,
    options: RenderOptions,
) -> Result<()> {
    let url = validate_url(url)?;
    let renderer = ChromiumRenderer::new(chrome_path)?;
    let pages = PageRenderer::new(Arc::new(renderer), options);

    let pdf = pages
        .render(&url)
        .await
        .with_context(|| format!("failed to render {url}"))?;

    let output = output.unwrap_or_else(|| default_output(&url));
    tokio::fs::write(&output, &pdf)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("{} ({} bytes)", output.display(), pdf.len());
    Ok(())
}

/// `<host>.pdf` in the current directory.
fn default_output(url: &Url) -> PathBuf {
    let host = url
        .host_str()
        .unwrap_or("page")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect::<String>();
    PathBuf::from(format!("{host}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_uses_host() {
        let url = validate_url("https://docs.example.com/guide?x=1").unwrap();
        assert_eq!(default_output(&url), PathBuf::from("docs.example.com.pdf"));

        let url = validate_url("http://[::1]:8080/").unwrap();
        assert_eq!(default_output(&url), PathBuf::from("___1_.pdf"));
    }
}
