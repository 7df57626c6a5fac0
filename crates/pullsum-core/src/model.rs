//! Data model shared by the engine, the report and progress consumers.

use serde::{Deserialize, Serialize};

/// One object in the remote catalog. Immutable for the life of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Full storage key (may include the project prefix).
    pub key: String,
    /// Object size in bytes as reported by the catalog.
    pub size: u64,
    /// True for checksum manifests (`*.md5`, `md5sum.txt`, ...).
    pub is_checksum_file: bool,
}

/// Per-file progress, updated by the task that owns `relative_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProgress {
    pub relative_key: String,
    pub bytes_downloaded: u64,
    pub bytes_total: u64,
    /// Bytes so far divided by seconds since this file's transfer started.
    pub instantaneous_speed_bps: u64,
}

/// Coarse stage of a run. Ordered so that transitions can be checked with `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Listing,
    Downloading,
    Verifying,
    Done,
}

/// Aggregate progress across all files of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub total_files: usize,
    pub completed_files: usize,
    pub total_bytes: u64,
    pub downloaded_bytes: u64,
    pub speed_bps: u64,
    pub phase: Phase,
}

impl OverallProgress {
    /// Fraction of bytes downloaded in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return if self.phase == Phase::Done { 1.0 } else { 0.0 };
        }
        (self.downloaded_bytes as f64 / self.total_bytes as f64).min(1.0)
    }

    /// Estimated seconds remaining (None if the aggregate speed is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.downloaded_bytes);
        if remaining == 0 {
            return Some(0.0);
        }
        if self.speed_bps == 0 {
            return None;
        }
        Some(remaining as f64 / self.speed_bps as f64)
    }
}

/// Outcome of verifying one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    Match,
    Mismatch,
    NoManifest,
    Error,
}

impl VerifyStatus {
    /// Statuses the retry selector re-runs.
    pub fn is_failure(self) -> bool {
        matches!(self, VerifyStatus::Mismatch | VerifyStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VerifyStatus::Match => "match",
            VerifyStatus::Mismatch => "mismatch",
            VerifyStatus::NoManifest => "no_manifest",
            VerifyStatus::Error => "error",
        }
    }
}

/// Result of one transfer task. Never mutated after it is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub relative_key: String,
    pub status: VerifyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_digest: Option<String>,
    /// Human-readable cause, only for `VerifyStatus::Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResult {
    /// Classify a computed digest against the manifest entry (if any).
    pub fn classify(relative_key: String, expected: Option<String>, computed: String) -> Self {
        let status = match expected.as_deref() {
            None => VerifyStatus::NoManifest,
            Some(e) if e.eq_ignore_ascii_case(&computed) => VerifyStatus::Match,
            Some(_) => VerifyStatus::Mismatch,
        };
        Self {
            relative_key,
            status,
            expected_digest: expected,
            computed_digest: Some(computed),
            error: None,
        }
    }

    /// A failed transfer: no digest was computed.
    pub fn failed(relative_key: String, error: impl Into<String>) -> Self {
        Self {
            relative_key,
            status: VerifyStatus::Error,
            expected_digest: None,
            computed_digest: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_match_is_case_insensitive() {
        let r = VerifyResult::classify(
            "a.bin".into(),
            Some("D41D8CD98F00B204E9800998ECF8427E".into()),
            "d41d8cd98f00b204e9800998ecf8427e".into(),
        );
        assert_eq!(r.status, VerifyStatus::Match);
    }

    #[test]
    fn classify_mismatch_and_no_manifest() {
        let r = VerifyResult::classify("a".into(), Some("00".repeat(16)), "11".repeat(16));
        assert_eq!(r.status, VerifyStatus::Mismatch);
        assert_eq!(r.expected_digest.as_deref(), Some("00".repeat(16).as_str()));

        let r = VerifyResult::classify("a".into(), None, "11".repeat(16));
        assert_eq!(r.status, VerifyStatus::NoManifest);
        assert!(r.computed_digest.is_some());
    }

    #[test]
    fn failed_has_no_digests() {
        let r = VerifyResult::failed("x/y".into(), "boom");
        assert_eq!(r.status, VerifyStatus::Error);
        assert!(r.expected_digest.is_none());
        assert!(r.computed_digest.is_none());
        assert_eq!(r.error.as_deref(), Some("boom"));
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Listing < Phase::Downloading);
        assert!(Phase::Downloading < Phase::Verifying);
        assert!(Phase::Verifying < Phase::Done);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&VerifyStatus::NoManifest).unwrap();
        assert_eq!(json, "\"no_manifest\"");
    }

    #[test]
    fn overall_fraction_and_eta() {
        let p = OverallProgress {
            total_files: 2,
            completed_files: 1,
            total_bytes: 1000,
            downloaded_bytes: 250,
            speed_bps: 50,
            phase: Phase::Downloading,
        };
        assert!((p.fraction() - 0.25).abs() < 1e-9);
        assert_eq!(p.eta_secs(), Some(15.0));
    }
}
