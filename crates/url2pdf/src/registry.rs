// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory, insertion-ordered list of submitted URLs.

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::UrlRecord;

/// Ordered URL list addressed by position.
///
/// Indices shift down after a delete, so callers must not hold an index
/// across another caller's delete.
#[derive(Default)]
pub struct UrlRegistry {
    records: RwLock<Vec<UrlRecord>>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its index.
    pub async fn add(&self, record: UrlRecord) -> usize {
        let mut records = self.records.write().await;
        records.push(record);
        records.len() - 1
    }

    /// Remove the record at `index`.
    pub async fn delete(&self, index: usize) -> Result<UrlRecord> {
        let mut records = self.records.write().await;
        if index >= records.len() {
            return Err(Error::NotFound(index));
        }
        Ok(records.remove(index))
    }

    /// URLs in insertion order.
    pub async fn list(&self) -> Vec<String> {
        self.records
            .read()
            .await
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    /// Remove everything, returning how many records were dropped.
    pub async fn clear(&self) -> usize {
        let mut records = self.records.write().await;
        let n = records.len();
        records.clear();
        n
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
