//! CLI for pullsum.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use pullsum_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_fetch, run_results, run_retry};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pullsum")]
#[command(about = "pullsum: bulk object download with MD5 manifest verification", long_about = None)]
pub struct Cli {
    /// More log detail (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where a run reads from and writes to.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// JSON catalog: array of {"key", "size", "is_checksum_file"?}.
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,
    /// Bucket holding the project's objects.
    #[arg(long)]
    pub bucket: String,
    /// Project prefix stripped from keys to form destination paths.
    #[arg(long)]
    pub project: String,
    /// Destination root directory.
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,
    /// Read objects from a local directory tree (`DIR/<bucket>/<key>`).
    #[arg(long, value_name = "DIR", conflicts_with = "endpoint")]
    pub source_dir: Option<PathBuf>,
    /// HTTP(S) endpoint serving `{endpoint}/{bucket}/{key}` (overrides config).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
    /// Files transferred concurrently (overrides config).
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
    /// Results report path (default: DEST/pullsum-results.json).
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and verify every file in the catalog.
    Fetch(RunArgs),

    /// Re-run only the files that failed in the previous report, then merge.
    Retry(RunArgs),

    /// Summarize a results report.
    Results {
        /// Report file to read.
        #[arg(long, value_name = "FILE", conflicts_with = "dest")]
        report: Option<PathBuf>,
        /// Destination root whose default report to read.
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// Print MD5 manifest lines (`digest  path`) for local files.
    Checksum {
        /// Files to hash.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Fetch(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(cfg, &args).await
            }
            CliCommand::Retry(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_retry(cfg, &args).await
            }
            CliCommand::Results { report, dest } => run_results(report, dest),
            CliCommand::Checksum { paths } => run_checksum(&paths),
        }
    }
}

#[cfg(test)]
mod tests;
