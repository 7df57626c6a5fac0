//! Transfer engine: manifests first, then bounded concurrent transfers.
//!
//! A run reads every manifest in the catalog, then transfers and verifies the
//! data files with at most `concurrency` in flight. Setup failures abort the
//! run before any transfer starts; per-file failures become `error` results.

mod scheduler;
mod task;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::PullsumConfig;
use crate::manifest::ChecksumManifest;
use crate::model::VerifyResult;
use crate::progress::worker::{ProgressWorker, TaskUpdate};
use crate::progress::ProgressEvent;
use crate::retry::{merge_results, run_with_retry, select_retry, RetryPolicy};
use crate::storage::Destination;
use crate::store::{ObjectStore, StoreError};

use self::task::TransferContext;

/// Fatal setup error: the run produced no results.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("create destination {path}: {source}")]
    Destination { path: PathBuf, source: io::Error },
    #[error("fetch checksum manifest {key}: {source}")]
    Manifest { key: String, source: StoreError },
}

/// Run tuning.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Maximum files in flight; 0 behaves as 1.
    pub concurrency: usize,
    /// Backoff for opening remote streams.
    pub retry: RetryPolicy,
    /// Task updates buffered ahead of the progress aggregator.
    pub progress_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&PullsumConfig::default())
    }
}

impl RunOptions {
    pub fn from_config(cfg: &PullsumConfig) -> Self {
        Self {
            concurrency: cfg.concurrency,
            retry: RetryPolicy::from_config(&cfg.retry_config()),
            progress_capacity: cfg.progress_channel_capacity,
        }
    }
}

/// Downloads and verifies catalogs from one object store.
pub struct TransferEngine {
    store: Arc<dyn ObjectStore>,
    options: RunOptions,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn ObjectStore>, options: RunOptions) -> Self {
        Self { store, options }
    }

    /// Transfers every data file of `catalog` from `bucket` into `dest_root`.
    ///
    /// Returns one result per data file, in completion order. Progress events
    /// go to `progress` when given; the last one is the `done` aggregate.
    pub async fn run(
        &self,
        bucket: &str,
        catalog: &Catalog,
        dest_root: &Path,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<Vec<VerifyResult>, EngineError> {
        let files: Vec<CatalogEntry> = catalog.data_files().cloned().collect();
        self.run_files(bucket, catalog, files, dest_root, progress).await
    }

    /// Re-runs only the data files whose result in `previous` was `mismatch`
    /// or `error`, and returns `previous` merged with the new outcomes.
    /// Manifests are read again so classification matches the first run.
    pub async fn retry(
        &self,
        bucket: &str,
        catalog: &Catalog,
        dest_root: &Path,
        previous: &[VerifyResult],
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<Vec<VerifyResult>, EngineError> {
        let selected = select_retry(previous, catalog);
        tracing::info!(selected = selected.len(), previous = previous.len(), "retrying failed files");
        let retried = if selected.is_empty() {
            Vec::new()
        } else {
            self.run_files(bucket, catalog, selected, dest_root, progress)
                .await?
        };
        Ok(merge_results(previous, retried, catalog))
    }

    async fn run_files(
        &self,
        bucket: &str,
        catalog: &Catalog,
        files: Vec<CatalogEntry>,
        dest_root: &Path,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<Vec<VerifyResult>, EngineError> {
        let worker = ProgressWorker::spawn(self.options.progress_capacity, progress);
        let setup = self.setup(bucket, catalog, dest_root).await;
        let (destination, manifest) = match setup {
            Ok(v) => v,
            Err(e) => {
                worker.abort();
                return Err(e);
            }
        };

        let total_files = files.len();
        let total_bytes: u64 = files.iter().map(|e| e.file.size).sum();
        tracing::info!(
            bucket,
            prefix = catalog.prefix(),
            files = total_files,
            bytes = total_bytes,
            concurrency = self.options.concurrency,
            "transfer run started"
        );
        let _ = worker
            .sender()
            .send(TaskUpdate::Begin {
                total_files,
                total_bytes,
            })
            .await;

        let ctx = Arc::new(TransferContext {
            bucket: bucket.to_string(),
            store: Arc::clone(&self.store),
            destination,
            manifest,
            retry: self.options.retry,
            progress: worker.sender(),
        });
        let results = scheduler::run_all(Arc::clone(&ctx), files, self.options.concurrency).await;
        drop(ctx);
        let overall = worker.finish().await;

        let failed = results.iter().filter(|r| r.status.is_failure()).count();
        tracing::info!(
            results = results.len(),
            failed,
            downloaded_bytes = overall.map(|o| o.downloaded_bytes).unwrap_or_default(),
            "transfer run finished"
        );
        Ok(results)
    }

    /// Destination root and merged manifests; any failure is fatal.
    async fn setup(
        &self,
        bucket: &str,
        catalog: &Catalog,
        dest_root: &Path,
    ) -> Result<(Destination, ChecksumManifest), EngineError> {
        let destination = Destination::open(dest_root)
            .await
            .map_err(|source| EngineError::Destination {
                path: dest_root.to_path_buf(),
                source,
            })?;

        let mut manifest = ChecksumManifest::new();
        for entry in catalog.manifests() {
            let key = entry.file.key.as_str();
            let text = run_with_retry(&self.options.retry, "fetch manifest", || {
                self.store.read_text(bucket, key)
            })
            .await
            .map_err(|source| EngineError::Manifest {
                key: key.to_string(),
                source,
            })?;
            let added = manifest.merge_text(&text);
            tracing::debug!(key, entries = added, "manifest loaded");
        }
        if manifest.is_empty() && catalog.manifests().next().is_some() {
            tracing::warn!("checksum manifests contain no entries; files will be no_manifest");
        }
        tracing::debug!(entries = manifest.len(), "manifests merged");
        Ok((destination, manifest))
    }
}
