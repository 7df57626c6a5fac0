//! Local destination tree.
//!
//! Files land at `root/<relative key>`, mirroring the remote key layout.
//! Sub-directory creation is idempotent and safe under concurrent attempts
//! (an existing directory is success). Each transfer task owns a disjoint
//! destination file, opened with truncation.

mod writer;

use std::io;
use std::path::{Path, PathBuf};

pub use writer::DestinationFile;

/// Root directory receiving a run's files.
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}

impl Destination {
    /// Creates `root` if needed. Failure here is a run-level setup error.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures `root/relative` exists and returns it. Empty `relative` is the root.
    pub async fn ensure_subdirectory(&self, relative: &Path) -> io::Result<PathBuf> {
        let dir = self.root.join(relative);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Creates (or truncates) `dir/name` for writing.
    pub async fn create_file(&self, dir: &Path, name: &str) -> io::Result<DestinationFile> {
        DestinationFile::create(dir.join(name)).await
    }
}
