// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP API for url2pdf.
//!
//! Endpoints keep the paths and payloads the web frontend already uses:
//! submit a URL and get back a `/static/...` link, list and delete
//! submitted URLs, and download every stored PDF as one zip.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use url2pdf::{validate_url, UrlRecord, ARCHIVE_NAME};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /add_url_and_generate_pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUrlRequest {
    pub url: String,
    #[serde(default)]
    pub response: String,
}

/// Reply to a successful render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPdf {
    pub message: String,
    pub pdf_url: String,
}

/// Build the axum Router with all endpoints and the static mount.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    let mount = state.store.mount().to_string();
    let static_files = ServeDir::new(state.store.root());

    Router::new()
        .route("/health", get(health))
        .route("/add_url_and_generate_pdf", post(add_url_and_generate_pdf))
        .route("/download_zip", get(download_zip))
        .route("/get_urls", get(get_urls))
        .route("/delete_url/:index", delete(delete_url))
        .route("/clear_pdfs", post(clear_pdfs))
        .nest_service(&mount, static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy admitting only `origins`, with credentials.
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// ── Handlers ────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "urls": state.registry.len().await,
        "tracked_pdfs": state.store.tracked().await.len(),
        "active_contexts": state.pages.active_contexts(),
    }))
}

async fn add_url_and_generate_pdf(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddUrlRequest>, JsonRejection>,
) -> Result<Json<GeneratedPdf>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let url = validate_url(&request.url).map_err(|e| ApiError::Validation(e.to_string()))?;

    info!(url = %url, "generating PDF");
    let pdf = state
        .pages
        .render(&url)
        .await
        .map_err(ApiError::Generation)?;
    let stored = state
        .store
        .persist(&pdf)
        .await
        .map_err(ApiError::Generation)?;

    let index = state
        .registry
        .add(UrlRecord {
            url,
            response: request.response,
        })
        .await;
    info!(index, pdf = %stored.url_path, "PDF generated");

    Ok(Json(GeneratedPdf {
        message: "PDF generated successfully".to_string(),
        pdf_url: stored.url_path,
    }))
}

async fn download_zip(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let archive = state.store.bundle().await.map_err(ApiError::Archive)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        archive.bytes,
    )
        .into_response())
}

async fn get_urls(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.registry.list().await)
}

async fn delete_url(
    State(state): State<Arc<AppState>>,
    index: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(raw) = index.map_err(|e| ApiError::Validation(e.body_text()))?;
    let index = parse_index(&raw)?;

    let removed = state
        .registry
        .delete(index)
        .await
        .map_err(|_| ApiError::UrlNotFound)?;
    info!(index, url = %removed.url, "URL deleted");

    Ok(Json(json!({ "message": "URL deleted successfully" })))
}

async fn clear_pdfs(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let removed = state.store.clear().await.map_err(ApiError::Clear)?;
    Ok(Json(json!({ "message": "All PDFs cleared", "removed": removed })))
}

/// Parse a registry index from a path segment.
///
/// Anything that is not an optionally signed run of digits is a 422. A
/// well-formed integer that cannot be a position (negative, or too large for
/// `usize`) is simply not found.
fn parse_index(raw: &str) -> Result<usize, ApiError> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::Validation(format!(
            "index must be an integer, got {raw:?}"
        )));
    }
    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(ApiError::UrlNotFound);
    }
    digits.parse::<usize>().map_err(|_| ApiError::UrlNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0").unwrap(), 0);
        assert_eq!(parse_index("+7").unwrap(), 7);
        assert_eq!(parse_index("-0").unwrap(), 0);
        assert_eq!(parse_index("007").unwrap(), 7);

        assert!(matches!(parse_index("-1"), Err(ApiError::UrlNotFound)));
        assert!(matches!(
            parse_index("99999999999999999999"),
            Err(ApiError::UrlNotFound)
        ));
        assert!(matches!(
            parse_index("-99999999999999999999"),
            Err(ApiError::UrlNotFound)
        ));

        for bad in ["", "-", "+", "first", "1.5", "1e3", " 1", "--1"] {
            assert!(
                matches!(parse_index(bad), Err(ApiError::Validation(_))),
                "accepted {bad:?}"
            );
        }
    }
}
