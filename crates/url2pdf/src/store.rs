// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

//! On-disk PDF store rooted at the static directory.
//!
//! Rendered PDFs are written as `<uuid>.pdf` directly under the root and
//! tracked in memory. [`PdfStore::bundle`] sweeps every `.pdf` below the
//! root into a single zip, deleting each file once it has been written.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::types::{Archive, StoredPdf};

/// Name of the archive produced by [`PdfStore::bundle`].
pub const ARCHIVE_NAME: &str = "pdfs.zip";

const PDF_EXTENSION: &str = ".pdf";

/// Filesystem-backed PDF storage.
pub struct PdfStore {
    root: PathBuf,
    /// URL prefix the root is served under, without trailing slash.
    mount: String,
    tracked: Mutex<Vec<StoredPdf>>,
}

impl PdfStore {
    /// Open a store at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>, mount: &str) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        Ok(Self {
            root,
            mount: mount.trim_end_matches('/').to_string(),
            tracked: Mutex::new(Vec::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_NAME)
    }

    /// Snapshot of the PDFs written by this store and not yet archived or cleared.
    pub async fn tracked(&self) -> Vec<StoredPdf> {
        self.tracked.lock().await.clone()
    }

    /// Write `bytes` to a freshly named file and start tracking it.
    pub async fn persist(&self, bytes: &[u8]) -> Result<StoredPdf> {
        let id = Uuid::new_v4();
        let file_name = format!("{id}{PDF_EXTENSION}");
        let file_path = self.root.join(&file_name);

        tokio::fs::write(&file_path, bytes).await?;

        let stored = StoredPdf {
            id,
            url_path: format!("{}/{file_name}", self.mount),
            file_name,
            file_path,
        };
        debug!(id = %stored.id, bytes = bytes.len(), "stored PDF");

        self.tracked.lock().await.push(stored.clone());
        Ok(stored)
    }

    /// Archive every PDF under the root into [`ARCHIVE_NAME`] and delete the originals.
    ///
    /// The archive is written and read back under the store lock, so a
    /// concurrent bundle cannot truncate it before the caller has its bytes.
    /// Files are deleted one by one as they are written; a failure part way
    /// through leaves earlier files archived and deleted and later ones in
    /// place.
    pub async fn bundle(&self) -> Result<Archive> {
        let mut tracked = self.tracked.lock().await;

        let root = self.root.clone();
        let archive_path = self.archive_path();
        let (entries, bytes) = {
            let archive_path = archive_path.clone();
            tokio::task::spawn_blocking(move || -> Result<(Vec<String>, Vec<u8>)> {
                let entries = write_archive(&root, &archive_path)?;
                let bytes = std::fs::read(&archive_path).map_err(|e| {
                    Error::Archive(format!("failed to read {}: {e}", archive_path.display()))
                })?;
                Ok((entries, bytes))
            })
            .await
            .map_err(|e| Error::Archive(format!("archive task failed: {e}")))??
        };

        tracked.retain(|pdf| pdf.file_path.exists());
        info!(
            entries = entries.len(),
            bytes = bytes.len(),
            path = %archive_path.display(),
            "archive written"
        );

        Ok(Archive {
            path: archive_path,
            entries,
            bytes,
        })
    }

    /// Delete every tracked PDF. Files already gone are ignored.
    pub async fn clear(&self) -> Result<usize> {
        let mut tracked = self.tracked.lock().await;
        let mut removed = 0;

        for pdf in tracked.iter() {
            match tokio::fs::remove_file(&pdf.file_path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        tracked.clear();

        info!(removed, "cleared PDFs");
        Ok(removed)
    }
}

fn write_archive(root: &Path, archive_path: &Path) -> Result<Vec<String>> {
    let mut pdfs = Vec::new();
    collect_pdfs(root, &mut pdfs)
        .map_err(|e| Error::Archive(format!("failed to scan {}: {e}", root.display())))?;
    pdfs.sort();

    let file = File::create(archive_path).map_err(|e| {
        Error::Archive(format!("failed to create {}: {e}", archive_path.display()))
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = Vec::with_capacity(pdfs.len());
    for path in pdfs {
        let name = entry_name(root, &path);
        zip.start_file(name.as_str(), options)?;

        let mut source = File::open(&path)?;
        io::copy(&mut source, &mut zip)?;
        drop(source);

        std::fs::remove_file(&path)?;
        entries.push(name);
    }

    zip.finish()?;
    Ok(entries)
}

fn collect_pdfs(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_pdfs(&path, out)?;
        } else if file_type.is_file()
            && entry.file_name().to_string_lossy().ends_with(PDF_EXTENSION)
        {
            out.push(path);
        } else if file_type.is_symlink() {
            warn!(path = %path.display(), "skipping symlink in static directory");
        }
    }
    Ok(())
}

/// Archive entry name: the path relative to the root, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &[u8] = b"%PDF-1.7\n%test\n";

    #[test]
    fn test_entry_name_is_relative() {
        let root = Path::new("/srv/static");
        assert_eq!(entry_name(root, Path::new("/srv/static/a.pdf")), "a.pdf");
        assert_eq!(
            entry_name(root, Path::new("/srv/static/2024/jan/a.pdf")),
            "2024/jan/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_persist_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PdfStore::open(dir.path(), "/static/").await.unwrap();

        let stored = store.persist(PDF).await.unwrap();

        assert_eq!(stored.file_name, format!("{}.pdf", stored.id));
        assert_eq!(stored.url_path, format!("/static/{}.pdf", stored.id));
        assert_eq!(std::fs::read(&stored.file_path).unwrap(), PDF);
        assert_eq!(store.tracked().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_persist_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = PdfStore::open(dir.path(), "/static").await.unwrap();

        let a = store.persist(PDF).await.unwrap();
        let b = store.persist(PDF).await.unwrap();
        assert_ne!(a.file_name, b.file_name);
    }

    #[tokio::test]
    async fn test_open_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/static");
        PdfStore::open(&root, "/static").await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PdfStore::open(dir.path(), "/static").await.unwrap();

        let a = store.persist(PDF).await.unwrap();
        let b = store.persist(PDF).await.unwrap();
        std::fs::remove_file(&b.file_path).unwrap();

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(!a.file_path.exists());
        assert!(store.tracked().await.is_empty());

        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_leaves_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = PdfStore::open(dir.path(), "/static").await.unwrap();
        let foreign = dir.path().join("manual.pdf");
        std::fs::write(&foreign, PDF).unwrap();

        store.persist(PDF).await.unwrap();
        store.clear().await.unwrap();

        assert!(foreign.exists());
    }
}
