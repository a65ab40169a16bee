//! Local item catalog used to attach images to auction results.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::parser::normalize;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Image reference, a URL or a path under the static mount.
    #[serde(default, rename = "png")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry whose normalized name contains `normalized_term`,
    /// preferring the longest normalized name. Ties go to the earliest entry.
    #[must_use]
    pub fn best_match(&self, normalized_term: &str) -> Option<&CatalogEntry> {
        let mut best: Option<(&CatalogEntry, usize)> = None;

        for entry in &self.entries {
            let name = normalize(&entry.name);
            if !name.contains(normalized_term) {
                continue;
            }
            let len = name.chars().count();
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((entry, len));
            }
        }

        best.map(|(entry, _)| entry)
    }
}

/// Reads the item catalog from disk.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    path: PathBuf,
}

impl CatalogLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn try_load(&self) -> Result<Catalog> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", self.path.display()))?;

        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", self.path.display()))?;

        Ok(Catalog::new(entries))
    }

    /// Like [`Self::try_load`], but a missing or corrupt file yields an empty catalog.
    pub async fn load(&self) -> Catalog {
        match self.try_load().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Item catalog unavailable, continuing without images");
                Catalog::default()
            }
        }
    }
}
