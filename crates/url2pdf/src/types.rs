// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data types: submitted URLs, stored PDFs, archives and render tuning.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A URL submitted for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: Url,
    /// Free-form annotation carried alongside the URL. Not interpreted.
    #[serde(default)]
    pub response: String,
}

impl UrlRecord {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            response: String::new(),
        }
    }
}

/// A rendered PDF written into the static directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPdf {
    pub id: Uuid,
    /// `<id>.pdf`
    pub file_name: String,
    /// Absolute or root-relative location on disk.
    pub file_path: PathBuf,
    /// Path under the static mount, e.g. `/static/<id>.pdf`.
    pub url_path: String,
}

/// Result of bundling the static directory into a zip file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub path: PathBuf,
    /// Entry names written into the archive, in write order.
    pub entries: Vec<String>,
    /// Contents of the finished zip, read back before the store lock is released.
    pub bytes: Vec<u8>,
}

/// Tuning knobs for a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub navigation_timeout: Duration,
    /// Pixels scrolled per settle step.
    pub scroll_step_px: u32,
    pub scroll_pause: Duration,
    pub max_scroll_steps: u32,
    pub image_timeout: Duration,
    pub image_poll_interval: Duration,
    /// Upper bound for navigate + settle + images + print.
    pub deadline: Duration,
    /// Upper bound for releasing the session once the render is over.
    pub close_timeout: Duration,
    pub print_background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            scroll_step_px: 1000,
            scroll_pause: Duration::from_millis(500),
            max_scroll_steps: 50,
            image_timeout: Duration::from_secs(15),
            image_poll_interval: Duration::from_millis(250),
            deadline: Duration::from_secs(120),
            close_timeout: Duration::from_secs(10),
            print_background: true,
        }
    }
}

/// Parse and check a user-supplied URL.
///
/// Only absolute `http`/`https` URLs with a host are accepted.
pub fn validate_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(Error::Validation("URL is empty".to_string()));
    }
    if raw.trim() != raw {
        return Err(Error::Validation(
            "URL must not contain surrounding whitespace".to_string(),
        ));
    }

    let url = Url::parse(raw).map_err(|e| Error::Validation(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Validation(format!(
                "unsupported scheme '{other}', expected http or https"
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Validation(format!("{raw}: missing host")));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_http_and_https() {
        let url = validate_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");

        let url = validate_url("http://localhost:8080/a?b=c").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        for raw in [
            "",
            "not a url",
            "example.com",
            "ftp://example.com/file",
            "file:///etc/passwd",
            "javascript:alert(1)",
            " https://example.com",
        ] {
            let err = validate_url(raw).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_record_response_defaults_to_empty() {
        let record: UrlRecord =
            serde_json::from_str(r#"{"url":"https://example.com/"}"#).unwrap();
        assert_eq!(record.response, "");
        assert_eq!(record, UrlRecord::new(validate_url("https://example.com").unwrap()));
    }

    #[test]
    fn test_default_options_match_documented_values() {
        let opts = RenderOptions::default();
        assert_eq!(opts.image_timeout, Duration::from_secs(15));
        assert_eq!(opts.scroll_step_px, 1000);
        assert!(opts.print_background);
        assert!(opts.deadline > opts.navigation_timeout);
    }
}
