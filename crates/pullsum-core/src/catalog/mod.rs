//! Remote file catalog.
//!
//! The catalog is produced outside the engine (listing or a pre-shared list).
//! Keys are normalized once at ingestion: each entry carries both the raw
//! storage key and its relative key (project prefix stripped), which is also
//! its destination path.

mod path;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::manifest::is_manifest_key;
use crate::model::RemoteFile;

pub use path::{canonical_relative_key, project_prefix, relative_key, safe_relative_path};

/// A catalog file plus its canonical relative key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub file: RemoteFile,
    pub relative_key: String,
}

/// Ordered, de-duplicated set of remote files under one project prefix.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    prefix: String,
    entries: Vec<CatalogEntry>,
}

/// On-disk catalog row; `is_checksum_file` is inferred from the key when absent.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    key: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    is_checksum_file: Option<bool>,
}

impl Catalog {
    /// Builds a catalog for `project`. Directory markers (keys ending in `/`)
    /// are dropped. Keys that resolve to the same relative key (with or
    /// without the prefix, or differing only in empty and `.` segments) are
    /// one destination file: the first wins.
    pub fn new(project: &str, files: impl IntoIterator<Item = RemoteFile>) -> Self {
        let prefix = project_prefix(project);
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for file in files {
            if file.key.is_empty() || file.key.ends_with('/') {
                continue;
            }
            let stripped = relative_key(&prefix, &file.key);
            // Unsafe keys stay as-is; the transfer rejects them per file.
            let relative_key =
                canonical_relative_key(stripped).unwrap_or_else(|| stripped.to_string());
            if !seen.insert(relative_key.clone()) {
                tracing::warn!(key = %file.key, %relative_key, "duplicate catalog entry ignored");
                continue;
            }
            entries.push(CatalogEntry { file, relative_key });
        }
        Self { prefix, entries }
    }

    /// Builds a catalog from `(key, size)` pairs, detecting manifests by key suffix.
    pub fn from_keys<K: Into<String>>(project: &str, keys: impl IntoIterator<Item = (K, u64)>) -> Self {
        Self::new(
            project,
            keys.into_iter().map(|(key, size)| {
                let key = key.into();
                RemoteFile {
                    is_checksum_file: is_manifest_key(&key),
                    key,
                    size,
                }
            }),
        )
    }

    /// Parses a JSON array of `{ "key", "size", "is_checksum_file"? }`.
    pub fn from_json(project: &str, json: &str) -> Result<Self> {
        let rows: Vec<CatalogRow> = serde_json::from_str(json).context("parse catalog JSON")?;
        Ok(Self::new(
            project,
            rows.into_iter().map(|row| RemoteFile {
                is_checksum_file: row
                    .is_checksum_file
                    .unwrap_or_else(|| is_manifest_key(&row.key)),
                key: row.key,
                size: row.size,
            }),
        ))
    }

    /// Loads a JSON catalog file.
    pub fn load_json(path: &Path, project: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        Self::from_json(project, &data).with_context(|| format!("catalog {}", path.display()))
    }

    /// Project prefix (with trailing `/`, or empty).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checksum manifests, in catalog order.
    pub fn manifests(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.file.is_checksum_file)
    }

    /// Data files (everything that is not a manifest), in catalog order.
    pub fn data_files(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| !e.file.is_checksum_file)
    }
}
