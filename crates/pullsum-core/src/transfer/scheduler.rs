//! Bounded FIFO scheduler over transfer tasks.
//!
//! Keeps at most `concurrency` tasks in a `JoinSet`; each time one settles,
//! the next file in catalog order is admitted. Runs every file to a result.

use std::sync::Arc;

use tokio::task::JoinSet;

use super::task::{transfer_file, TransferContext};
use crate::catalog::CatalogEntry;
use crate::model::VerifyResult;
use crate::progress::worker::TaskUpdate;

/// Runs `files` with at most `concurrency` in flight (0 is treated as 1).
/// Returns one result per input file, in completion order.
pub(crate) async fn run_all(
    ctx: Arc<TransferContext>,
    files: Vec<CatalogEntry>,
    concurrency: usize,
) -> Vec<VerifyResult> {
    let concurrency = concurrency.max(1);
    let mut queue = files.into_iter();
    let mut join_set = JoinSet::new();
    // Keys admitted but not yet settled; whatever is left after a panic.
    let mut in_flight: Vec<String> = Vec::new();
    let mut results = Vec::with_capacity(queue.len());

    loop {
        while join_set.len() < concurrency {
            let Some(entry) = queue.next() else {
                break;
            };
            in_flight.push(entry.relative_key.clone());
            join_set.spawn(transfer_file(Arc::clone(&ctx), entry));
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        match joined {
            Ok(result) => {
                if let Some(pos) = in_flight.iter().position(|k| *k == result.relative_key) {
                    in_flight.swap_remove(pos);
                }
                results.push(result);
            }
            Err(e) => {
                tracing::warn!(error = %e, "transfer task did not complete");
            }
        }
    }

    // Left over only when a task panicked before producing its result.
    for key in in_flight {
        let _ = ctx.progress.send(TaskUpdate::Finished(key.clone())).await;
        results.push(VerifyResult::failed(key, "transfer task panicked"));
    }
    results
}
