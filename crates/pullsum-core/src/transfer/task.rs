//! One file: stream → destination file + MD5 → classification.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::catalog::{safe_relative_path, CatalogEntry};
use crate::checksum::ChecksumStream;
use crate::manifest::ChecksumManifest;
use crate::model::{FileProgress, VerifyResult};
use crate::progress::worker::TaskUpdate;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::Destination;
use crate::store::{ObjectStore, StoreError};

/// Per-file failure. Never escapes the task: it becomes an `error` result.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransferError {
    #[error("unsafe destination path for key {0:?}")]
    UnsafeKey(String),
    #[error("create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("create file {path}: {source}")]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("open remote stream: {0}")]
    Open(#[source] StoreError),
    #[error("read remote stream: {0}")]
    Read(#[source] StoreError),
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// State shared by every transfer task of one run.
pub(crate) struct TransferContext {
    pub bucket: String,
    pub store: Arc<dyn ObjectStore>,
    pub destination: Destination,
    pub manifest: ChecksumManifest,
    pub retry: RetryPolicy,
    pub progress: mpsc::Sender<TaskUpdate>,
}

/// Transfers and verifies one catalog entry. Always yields exactly one
/// result and always reports the file as finished to the aggregator.
pub(crate) async fn transfer_file(ctx: Arc<TransferContext>, entry: CatalogEntry) -> VerifyResult {
    let result = match try_transfer(&ctx, &entry).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(key = %entry.file.key, error = %e, "transfer failed");
            VerifyResult::failed(entry.relative_key.clone(), e.to_string())
        }
    };
    tracing::debug!(key = %entry.relative_key, status = result.status.as_str(), "file settled");
    let _ = ctx
        .progress
        .send(TaskUpdate::Finished(entry.relative_key))
        .await;
    result
}

async fn try_transfer(ctx: &TransferContext, entry: &CatalogEntry) -> Result<VerifyResult, TransferError> {
    let relative = safe_relative_path(&entry.relative_key)
        .ok_or_else(|| TransferError::UnsafeKey(entry.relative_key.clone()))?;
    let file_name = relative
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TransferError::UnsafeKey(entry.relative_key.clone()))?;
    let parent = relative.parent().unwrap_or(relative.as_path());
    let dir = ctx
        .destination
        .ensure_subdirectory(parent)
        .await
        .map_err(|source| TransferError::CreateDir {
            path: ctx.destination.root().join(parent),
            source,
        })?;

    let mut stream = run_with_retry(&ctx.retry, "open remote stream", || {
        ctx.store.open_read_stream(&ctx.bucket, &entry.file.key)
    })
    .await
    .map_err(TransferError::Open)?;

    let mut out = ctx
        .destination
        .create_file(&dir, file_name)
        .await
        .map_err(|source| TransferError::CreateFile {
            path: dir.join(file_name),
            source,
        })?;

    let started = Instant::now();
    let mut digest = ChecksumStream::new();
    while let Some(chunk) = stream.next_chunk().await.map_err(TransferError::Read)? {
        out.write(&chunk).await.map_err(|source| TransferError::Write {
            path: out.path().to_path_buf(),
            source,
        })?;
        digest.update(&chunk);
        let update = FileProgress {
            relative_key: entry.relative_key.clone(),
            bytes_downloaded: digest.bytes(),
            bytes_total: entry.file.size,
            instantaneous_speed_bps: speed_bps(digest.bytes(), started),
        };
        let _ = ctx.progress.send(TaskUpdate::Chunk(update)).await;
    }

    let path = out.path().to_path_buf();
    let written = out
        .close()
        .await
        .map_err(|source| TransferError::Write { path, source })?;
    if written != entry.file.size {
        tracing::debug!(key = %entry.relative_key, written, catalog_size = entry.file.size, "size differs from catalog");
    }

    let computed = digest.finalize_hex();
    let expected = ctx.manifest.expected_for(&entry.relative_key).map(str::to_string);
    Ok(VerifyResult::classify(entry.relative_key.clone(), expected, computed))
}

/// Bytes so far over seconds since the file started (0 before any time passed).
fn speed_bps(bytes: u64, started: Instant) -> u64 {
    let secs = started.elapsed().as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (bytes as f64 / secs) as u64
}
