//! Terminal progress line, refreshed at most every 500 ms and on phase changes.

use pullsum_core::{OverallProgress, Phase, ProgressEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Spawns the renderer; the engine gets the sender.
pub(super) fn spawn_renderer() -> (mpsc::Sender<ProgressEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(64);
    let handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        let mut last_phase = None;
        while let Some(event) = rx.recv().await {
            let ProgressEvent::Overall(o) = event else {
                continue;
            };
            let due = last_print.map_or(true, |t| t.elapsed() >= PROGRESS_INTERVAL);
            if due || last_phase != Some(o.phase) {
                println!("{}", render(&o));
                last_print = Some(Instant::now());
                last_phase = Some(o.phase);
            }
        }
    });
    (tx, handle)
}

fn render(o: &OverallProgress) -> String {
    match o.phase {
        Phase::Listing => "  reading manifests...".to_string(),
        _ => {
            let done_mib = o.downloaded_bytes as f64 / 1_048_576.0;
            let total_mib = o.total_bytes as f64 / 1_048_576.0;
            let rate_mib = o.speed_bps as f64 / 1_048_576.0;
            let eta = o
                .eta_secs()
                .map(|s| format!("{:.0}s", s))
                .unwrap_or_else(|| "?".to_string());
            format!(
                "  [{}] {}/{} files  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ETA {}",
                phase_label(o.phase),
                o.completed_files,
                o.total_files,
                done_mib,
                total_mib,
                o.fraction() * 100.0,
                rate_mib,
                eta
            )
        }
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Listing => "listing",
        Phase::Downloading => "downloading",
        Phase::Verifying => "verifying",
        Phase::Done => "done",
    }
}
