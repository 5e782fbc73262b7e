// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the renderer, the PDF store and the URL registry.

use std::time::Duration;

/// Errors that can occur while rendering, storing or tracking pages.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Navigation, script evaluation or print-to-PDF failed.
    #[error("render error: {0}")]
    Render(String),

    /// A render stage ran past its deadline.
    #[error("{stage} timed out after {}ms", after.as_millis())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },

    /// No browser could be found or launched.
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// The zip archive could not be created or written.
    #[error("archive error: {0}")]
    Archive(String),

    /// Registry index outside the current bounds.
    #[error("no URL at index {0}")]
    NotFound(usize),

    /// Input rejected before any work was attempted.
    #[error("invalid URL: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_stage() {
        let err = Error::Timeout {
            stage: "render",
            after: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "render timed out after 2000ms");
    }

    #[test]
    fn test_zip_error_becomes_archive_error() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::Archive(_)));
    }
}
