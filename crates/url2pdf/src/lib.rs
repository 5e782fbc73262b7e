// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! url2pdf: render web pages to PDF with a headless browser, keep the
//! results in a static directory and bundle them into zip archives.

pub mod error;
pub mod registry;
pub mod renderer;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use registry::UrlRegistry;
pub use renderer::chromium::{find_chromium, ChromiumRenderer};
pub use renderer::settle::{ImageReadiness, SettleOutcome};
pub use renderer::{NavigationResult, NoopRenderer, PageRenderer, RenderContext, Renderer};
pub use store::{PdfStore, ARCHIVE_NAME};
pub use types::{validate_url, Archive, RenderOptions, StoredPdf, UrlRecord};
