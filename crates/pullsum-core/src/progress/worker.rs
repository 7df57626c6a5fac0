//! Aggregator task: the only owner of the run's [`OverallProgress`].
//!
//! Transfer tasks send [`TaskUpdate`]s through a bounded channel; the loop
//! folds them and forwards [`ProgressEvent`]s to an optional subscriber.
//! When every sender is dropped the run is finished and `done` is emitted.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{ProgressAggregator, ProgressEvent};
use crate::model::{FileProgress, OverallProgress, Phase};

/// Message from the engine or a transfer task to the aggregator.
#[derive(Debug)]
pub(crate) enum TaskUpdate {
    Begin { total_files: usize, total_bytes: u64 },
    Chunk(FileProgress),
    Finished(String),
}

/// Handle to a running aggregator task.
pub(crate) struct ProgressWorker {
    tx: mpsc::Sender<TaskUpdate>,
    join: JoinHandle<OverallProgress>,
}

impl ProgressWorker {
    /// Spawns the loop; it emits the initial `listing` aggregate right away.
    pub(crate) fn spawn(capacity: usize, subscriber: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let join = tokio::spawn(run_aggregator(rx, subscriber));
        Self { tx, join }
    }

    pub(crate) fn sender(&self) -> mpsc::Sender<TaskUpdate> {
        self.tx.clone()
    }

    /// Closes the engine's sender and waits for the final (`done`) aggregate.
    /// Every other sender must already be dropped.
    pub(crate) async fn finish(self) -> Option<OverallProgress> {
        drop(self.tx);
        match self.join.await {
            Ok(overall) => Some(overall),
            Err(e) => {
                tracing::warn!(error = %e, "progress aggregator failed");
                None
            }
        }
    }

    /// Stops the loop without a `done` event (fatal setup error).
    pub(crate) fn abort(self) {
        self.join.abort();
    }
}

async fn run_aggregator(
    mut rx: mpsc::Receiver<TaskUpdate>,
    subscriber: Option<mpsc::Sender<ProgressEvent>>,
) -> OverallProgress {
    let mut agg = ProgressAggregator::new();
    let mut out = Subscriber(subscriber);
    out.overall(agg.snapshot()).await;

    while let Some(update) = rx.recv().await {
        match update {
            TaskUpdate::Begin {
                total_files,
                total_bytes,
            } => {
                let o = agg.begin_downloading(total_files, total_bytes);
                out.overall(o).await;
            }
            TaskUpdate::Chunk(file) => {
                let o = agg.apply(&file);
                out.send(ProgressEvent::File(file)).await;
                out.overall(o).await;
            }
            TaskUpdate::Finished(key) => {
                if let Some(o) = agg.complete(&key) {
                    out.overall(o).await;
                }
            }
        }
    }

    if let Some(o) = agg.advance(Phase::Done) {
        out.overall(o).await;
    }
    agg.snapshot()
}

/// Optional event sink; a subscriber that hangs up is dropped silently.
struct Subscriber(Option<mpsc::Sender<ProgressEvent>>);

impl Subscriber {
    async fn send(&mut self, event: ProgressEvent) {
        if let Some(tx) = &self.0 {
            if tx.send(event).await.is_err() {
                tracing::debug!("progress subscriber closed");
                self.0 = None;
            }
        }
    }

    async fn overall(&mut self, o: OverallProgress) {
        self.send(ProgressEvent::Overall(o)).await;
    }
}
