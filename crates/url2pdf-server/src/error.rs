// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP error mapping.
//!
//! Every failure leaves the API as a JSON body of the form
//! `{"detail": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body or path parameter rejected before any work was done.
    #[error("{0}")]
    Validation(String),

    #[error("URL not found")]
    UrlNotFound,

    #[error("Failed to generate PDF: {0}")]
    Generation(url2pdf::Error),

    #[error("Failed to create zip file: {0}")]
    Archive(url2pdf::Error),

    #[error("Failed to clear PDFs: {0}")]
    Clear(url2pdf::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UrlNotFound => StatusCode::NOT_FOUND,
            ApiError::Generation(_) | ApiError::Archive(_) | ApiError::Clear(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{detail}");
        } else {
            tracing::debug!(status = status.as_u16(), "{detail}");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::UrlNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Generation(url2pdf::Error::Render("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_detail_carries_cause() {
        let err = ApiError::Archive(url2pdf::Error::Archive("disk full".into()));
        assert_eq!(
            err.to_string(),
            "Failed to create zip file: archive error: disk full"
        );
    }
}
