//! Run progress: per-file updates folded into one monotone aggregate.
//!
//! [`ProgressAggregator`] is the pure state machine; [`worker`] runs it as the
//! single owner of the aggregate behind a bounded channel.

pub(crate) mod worker;

use std::collections::HashMap;

use crate::model::{FileProgress, OverallProgress, Phase};

/// Event delivered to a progress subscriber (e.g. the CLI renderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    File(FileProgress),
    Overall(OverallProgress),
}

#[derive(Debug, Default, Clone, Copy)]
struct FileState {
    bytes: u64,
    speed_bps: u64,
    finished: bool,
}

/// Folds [`FileProgress`] updates into an [`OverallProgress`].
///
/// Invariants: `downloaded_bytes` is the sum of every file's latest byte
/// count (per-file counts never go backwards), `completed_files` counts each
/// key once, and the phase only moves forward.
#[derive(Debug)]
pub struct ProgressAggregator {
    overall: OverallProgress,
    files: HashMap<String, FileState>,
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self {
            overall: OverallProgress {
                total_files: 0,
                completed_files: 0,
                total_bytes: 0,
                downloaded_bytes: 0,
                speed_bps: 0,
                phase: Phase::Listing,
            },
            files: HashMap::new(),
        }
    }

    pub fn snapshot(&self) -> OverallProgress {
        self.overall.clone()
    }

    /// Moves to `phase` if it is ahead of the current one. Returns the new
    /// aggregate on a transition, `None` if the phase would regress or repeat.
    pub fn advance(&mut self, phase: Phase) -> Option<OverallProgress> {
        if phase <= self.overall.phase {
            return None;
        }
        self.overall.phase = phase;
        if phase == Phase::Done {
            self.overall.speed_bps = 0;
        }
        Some(self.snapshot())
    }

    /// Sets the run totals and enters `downloading`.
    pub fn begin_downloading(&mut self, total_files: usize, total_bytes: u64) -> OverallProgress {
        self.overall.total_files = total_files;
        self.overall.total_bytes = total_bytes;
        self.advance(Phase::Downloading);
        self.snapshot()
    }

    /// Applies one file's latest counters.
    pub fn apply(&mut self, update: &FileProgress) -> OverallProgress {
        let state = self.files.entry(update.relative_key.clone()).or_default();
        if update.bytes_downloaded > state.bytes {
            self.overall.downloaded_bytes += update.bytes_downloaded - state.bytes;
            state.bytes = update.bytes_downloaded;
        }
        if !state.finished && self.overall.phase != Phase::Done {
            self.overall.speed_bps = self
                .overall
                .speed_bps
                .saturating_sub(state.speed_bps)
                .saturating_add(update.instantaneous_speed_bps);
            state.speed_bps = update.instantaneous_speed_bps;
        }
        self.snapshot()
    }

    /// Marks `relative_key` finished. Returns the new aggregate the first
    /// time a key completes, `None` for repeats.
    pub fn complete(&mut self, relative_key: &str) -> Option<OverallProgress> {
        let state = self.files.entry(relative_key.to_string()).or_default();
        if state.finished {
            return None;
        }
        state.finished = true;
        self.overall.speed_bps = self.overall.speed_bps.saturating_sub(state.speed_bps);
        state.speed_bps = 0;
        self.overall.completed_files += 1;
        Some(self.snapshot())
    }
}
