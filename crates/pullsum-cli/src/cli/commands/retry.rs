//! `pullsum retry` – re-run failed files from the previous report.

use anyhow::{Context, Result};
use pullsum_core::config::PullsumConfig;
use pullsum_core::report;
use pullsum_core::retry::select_retry;

use super::progress::spawn_renderer;
use super::setup::{finish, prepare};
use crate::cli::RunArgs;

pub async fn run_retry(cfg: PullsumConfig, args: &RunArgs) -> Result<()> {
    let setup = prepare(cfg, args)?;
    let previous = report::load(&setup.report_path)
        .context("no previous results to retry (run `pullsum fetch` first)")?;
    let selected = select_retry(&previous, &setup.catalog).len();
    if selected == 0 {
        println!("Nothing to retry.");
    } else {
        println!("Retrying {} file(s).", selected);
    }

    let (progress_tx, progress_handle) = spawn_renderer();
    let merged = setup
        .engine
        .retry(&args.bucket, &setup.catalog, &args.dest, &previous, Some(progress_tx))
        .await;
    let _ = progress_handle.await;
    finish(&setup.report_path, &merged?)
}
