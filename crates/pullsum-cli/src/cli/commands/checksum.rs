//! `pullsum checksum` – print MD5 manifest lines for local files.

use anyhow::Result;
use pullsum_core::checksum;
use std::path::PathBuf;

/// Prints `digest  path` per file, the format the manifest parser reads back.
pub fn run_checksum(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let digest = checksum::md5_path(path)?;
        println!("{}  {}", digest, path.display());
    }
    Ok(())
}
