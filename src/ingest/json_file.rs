//! File-backed entry source.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use super::EntrySource;
use crate::domain::{EntryId, NewEntry};

/// Reads a JSON array of `{id, author, content}` objects, oldest first.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source over `path`. The file is read on every fetch.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EntrySource for JsonFileSource {
    async fn fetch_since(&self, watermark: Option<&EntryId>) -> anyhow::Result<Vec<NewEntry>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let mut entries: Vec<NewEntry> = serde_json::from_slice(&raw)
            .with_context(|| format!("decoding {}", self.path.display()))?;

        let seen = watermark.and_then(|mark| entries.iter().position(|e| &e.id == mark));
        if let Some(pos) = seen {
            entries.drain(..=pos);
        }
        Ok(entries)
    }
}
