//! Results report: the result list of a run persisted as JSON so a later
//! invocation can retry the failures.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{VerifyResult, VerifyStatus};

/// File name of the report inside the destination root.
pub const DEFAULT_REPORT_NAME: &str = "pullsum-results.json";

pub fn default_report_path(dest_root: &Path) -> PathBuf {
    dest_root.join(DEFAULT_REPORT_NAME)
}

/// Writes `results` (sorted by key) as pretty-printed JSON.
pub fn save(path: &Path, results: &[VerifyResult]) -> Result<()> {
    let mut sorted: Vec<&VerifyResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.relative_key.cmp(&b.relative_key));
    let json = serde_json::to_string_pretty(&sorted)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<VerifyResult>> {
    let data = fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))?;
    let results = serde_json::from_str(&data).with_context(|| format!("parse report {}", path.display()))?;
    Ok(results)
}

/// Per-status counts over a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub matched: usize,
    pub mismatched: usize,
    pub no_manifest: usize,
    pub errors: usize,
}

impl ResultSummary {
    pub fn from_results(results: &[VerifyResult]) -> Self {
        let mut s = Self::default();
        for r in results {
            match r.status {
                VerifyStatus::Match => s.matched += 1,
                VerifyStatus::Mismatch => s.mismatched += 1,
                VerifyStatus::NoManifest => s.no_manifest += 1,
                VerifyStatus::Error => s.errors += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.no_manifest + self.errors
    }

    /// Files a retry would re-run.
    pub fn failed(&self) -> usize {
        self.mismatched + self.errors
    }
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files: {} match, {} mismatch, {} no_manifest, {} error",
            self.total(),
            self.matched,
            self.mismatched,
            self.no_manifest,
            self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<VerifyResult> {
        vec![
            VerifyResult::classify("b.bin".into(), Some("aa".into()), "bb".into()),
            VerifyResult::classify("a.bin".into(), None, "cc".into()),
            VerifyResult::failed("c.bin".into(), "HTTP 500"),
        ]
    }

    #[test]
    fn summary_counts() {
        let s = ResultSummary::from_results(&results());
        assert_eq!(s.total(), 3);
        assert_eq!(s.failed(), 2);
        assert_eq!(s.no_manifest, 1);
        assert_eq!(s.to_string(), "3 files: 0 match, 1 mismatch, 1 no_manifest, 1 error");
    }

    #[test]
    fn save_then_load_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_report_path(&dir.path().join("nested"));
        save(&path, &results()).unwrap();
        let loaded = load(&path).unwrap();
        let keys: Vec<_> = loaded.iter().map(|r| r.relative_key.as_str()).collect();
        assert_eq!(keys, ["a.bin", "b.bin", "c.bin"]);
        assert_eq!(loaded[2].error.as_deref(), Some("HTTP 500"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"status\": \"no_manifest\""));
        assert!(!text.contains("\"error\": null"));
    }

    #[test]
    fn load_missing_report_fails_with_path() {
        let err = load(Path::new("/nonexistent/pullsum-results.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/pullsum-results.json"));
    }
}
