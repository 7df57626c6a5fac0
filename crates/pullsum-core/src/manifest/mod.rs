//! Checksum manifests: parsing and basename lookup.
//!
//! A manifest maps file basenames to lowercase MD5 hex digests. Several
//! manifests (per-directory or per-project) are merged before any transfer
//! starts; a later entry for the same basename replaces an earlier one.
//!
//! Matching is directory-insensitive: two files with the same basename in
//! different sub-directories resolve to the same expected digest.

mod parse;

use std::collections::HashMap;

pub use parse::{parse_line, ManifestLine};

/// Key suffixes (lowercased) that mark a catalog object as a checksum manifest.
const MANIFEST_SUFFIXES: &[&str] = &[".md5", "md5.txt", "md5sum.txt"];

/// True when `key` names a checksum manifest rather than a data file.
pub fn is_manifest_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    MANIFEST_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Last path segment of a `/`-separated key or path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// One `basename → digest` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumManifestEntry {
    pub basename: String,
    pub hex_digest: String,
}

/// Merged basename → digest mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text. Unrecognized lines contribute nothing.
    pub fn parse(content: &str) -> Self {
        let mut manifest = Self::new();
        manifest.merge_text(content);
        manifest
    }

    /// Parse `content` and merge its entries over the current ones.
    /// Returns the number of entries the text contributed.
    pub fn merge_text(&mut self, content: &str) -> usize {
        let mut added = 0;
        for line in content.lines() {
            if let ManifestLine::Entry(entry) = parse_line(line) {
                self.insert(entry);
                added += 1;
            }
        }
        added
    }

    pub fn insert(&mut self, entry: ChecksumManifestEntry) {
        self.entries.insert(entry.basename, entry.hex_digest);
    }

    /// Expected digest for a destination file, looked up by its basename.
    pub fn expected_for(&self, path: &str) -> Option<&str> {
        self.entries.get(basename(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
