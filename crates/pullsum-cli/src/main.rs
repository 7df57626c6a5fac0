use clap::Parser;
use pullsum_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Log file first; stderr if the state directory is unusable.
    if let Err(e) = logging::init_logging(cli.verbose) {
        logging::init_logging_stderr(cli.verbose);
        tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
    }

    if let Err(err) = cli.run().await {
        eprintln!("pullsum error: {:#}", err);
        std::process::exit(1);
    }
}
