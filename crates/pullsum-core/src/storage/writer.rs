//! Sequential writer for one destination file.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Buffered, append-only handle; `close` flushes and syncs.
pub struct DestinationFile {
    file: BufWriter<tokio::fs::File>,
    path: PathBuf,
    written: u64,
}

impl DestinationFile {
    pub(crate) async fn create(path: PathBuf) -> io::Result<Self> {
        let file = tokio::fs::File::create(&path).await?;
        Ok(Self {
            file: BufWriter::new(file),
            path,
            written: 0,
        })
    }

    /// Appends `chunk` after everything written so far.
    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered data, syncs it to disk and closes the file.
    /// Returns the total number of bytes written.
    pub async fn close(mut self) -> io::Result<u64> {
        self.file.flush().await?;
        self.file.get_mut().sync_all().await?;
        Ok(self.written)
    }
}
