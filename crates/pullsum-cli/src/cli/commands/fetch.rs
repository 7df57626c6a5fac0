//! `pullsum fetch` – download and verify a whole catalog.

use anyhow::Result;
use pullsum_core::config::PullsumConfig;

use super::progress::spawn_renderer;
use super::setup::{finish, prepare};
use crate::cli::RunArgs;

pub async fn run_fetch(cfg: PullsumConfig, args: &RunArgs) -> Result<()> {
    let setup = prepare(cfg, args)?;
    let (progress_tx, progress_handle) = spawn_renderer();
    let results = setup
        .engine
        .run(&args.bucket, &setup.catalog, &args.dest, Some(progress_tx))
        .await;
    let _ = progress_handle.await;
    finish(&setup.report_path, &results?)
}
