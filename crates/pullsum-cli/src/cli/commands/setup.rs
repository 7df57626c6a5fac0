//! Shared run setup: config overrides, object store, catalog and engine.

use anyhow::{bail, Context, Result};
use pullsum_core::config::PullsumConfig;
use pullsum_core::report::{self, ResultSummary};
use pullsum_core::store::{HttpStore, LocalStore, ObjectStore};
use pullsum_core::{Catalog, RunOptions, TransferEngine, VerifyResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::RunArgs;

/// Everything a fetch or retry needs.
pub(super) struct RunSetup {
    pub engine: TransferEngine,
    pub catalog: Catalog,
    pub report_path: PathBuf,
}

pub(super) fn prepare(mut cfg: PullsumConfig, args: &RunArgs) -> Result<RunSetup> {
    if let Some(n) = args.concurrency {
        cfg.concurrency = n;
    }
    let store = open_store(&cfg, args)?;
    let catalog = Catalog::load_json(&args.catalog, &args.project)?;
    tracing::debug!(
        entries = catalog.len(),
        manifests = catalog.manifests().count(),
        "catalog loaded"
    );
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| report::default_report_path(&args.dest));
    Ok(RunSetup {
        engine: TransferEngine::new(store, RunOptions::from_config(&cfg)),
        catalog,
        report_path,
    })
}

fn open_store(cfg: &PullsumConfig, args: &RunArgs) -> Result<Arc<dyn ObjectStore>> {
    if let Some(dir) = &args.source_dir {
        let store = LocalStore::open(dir)
            .with_context(|| format!("open source directory {}", dir.display()))?
            .with_chunk_size(cfg.chunk_size_bytes);
        return Ok(Arc::new(store));
    }
    let Some(endpoint) = args.endpoint.as_deref().or(cfg.endpoint.as_deref()) else {
        bail!("no object source: pass --source-dir or --endpoint, or set `endpoint` in config.toml");
    };
    let store = HttpStore::with_options(endpoint, cfg.http_options())
        .with_context(|| format!("endpoint {}", endpoint))?;
    Ok(Arc::new(store))
}

/// Saves the report and prints the summary. Errors when any file failed so
/// the process exits non-zero.
pub(super) fn finish(report_path: &Path, results: &[VerifyResult]) -> Result<()> {
    report::save(report_path, results)?;
    let summary = ResultSummary::from_results(results);
    println!("{}", summary);
    println!("report: {}", report_path.display());
    tracing::info!(%summary, "run summary");
    if summary.failed() > 0 {
        bail!(
            "{} file(s) failed verification; run `pullsum retry` with the same arguments",
            summary.failed()
        );
    }
    Ok(())
}
