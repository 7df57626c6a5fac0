//! Failed-file selection and result merging across runs.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, CatalogEntry};
use crate::model::VerifyResult;

/// Keys (as recorded in `previous`) whose status was `mismatch` or `error`.
pub fn failed_keys(previous: &[VerifyResult]) -> HashSet<&str> {
    previous
        .iter()
        .filter(|r| r.status.is_failure())
        .map(|r| r.relative_key.as_str())
        .collect()
}

/// Data files of `catalog` whose previous outcome was a failure. A prior
/// result matches an entry by its relative key or by its raw storage key.
pub fn select_retry(previous: &[VerifyResult], catalog: &Catalog) -> Vec<CatalogEntry> {
    let failed = failed_keys(previous);
    catalog
        .data_files()
        .filter(|e| failed.contains(e.relative_key.as_str()) || failed.contains(e.file.key.as_str()))
        .cloned()
        .collect()
}

/// Merged view after a retry run: prior `match`/`no_manifest` results are
/// kept, everything else is replaced by `retried`. A key retried in the new
/// run always takes the new outcome, and no key appears twice.
///
/// `catalog` maps raw keys in `previous` to relative keys so that a prior
/// result recorded under either form collapses onto one entry.
pub fn merge_results(
    previous: &[VerifyResult],
    retried: Vec<VerifyResult>,
    catalog: &Catalog,
) -> Vec<VerifyResult> {
    let raw_to_relative: HashMap<&str, &str> = catalog
        .entries()
        .iter()
        .map(|e| (e.file.key.as_str(), e.relative_key.as_str()))
        .collect();
    let canonical = |key: &str| -> String {
        raw_to_relative.get(key).copied().unwrap_or(key).to_string()
    };

    let retried_keys: HashSet<String> = retried.iter().map(|r| canonical(&r.relative_key)).collect();
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(previous.len().max(retried.len()));

    for r in previous {
        if r.status.is_failure() {
            continue;
        }
        let key = canonical(&r.relative_key);
        if retried_keys.contains(&key) || !seen.insert(key.clone()) {
            continue;
        }
        merged.push(VerifyResult {
            relative_key: key,
            ..r.clone()
        });
    }
    for r in retried {
        let key = canonical(&r.relative_key);
        if !seen.insert(key.clone()) {
            continue;
        }
        merged.push(VerifyResult {
            relative_key: key,
            ..r
        });
    }
    merged
}
