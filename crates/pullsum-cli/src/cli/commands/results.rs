//! `pullsum results` – summarize a saved report.

use anyhow::Result;
use pullsum_core::report::{self, ResultSummary};
use std::path::PathBuf;

pub fn run_results(report_path: Option<PathBuf>, dest: Option<PathBuf>) -> Result<()> {
    let path = match (report_path, dest) {
        (Some(p), _) => p,
        (None, Some(d)) => report::default_report_path(&d),
        (None, None) => report::default_report_path(&std::env::current_dir()?),
    };
    let results = report::load(&path)?;
    println!("{}", ResultSummary::from_results(&results));
    for r in results.iter().filter(|r| r.status.is_failure()) {
        match &r.error {
            Some(e) => println!("  {:<10} {}  ({})", r.status.as_str(), r.relative_key, e),
            None => println!("  {:<10} {}", r.status.as_str(), r.relative_key),
        }
    }
    Ok(())
}
