//! Streaming MD5 used inline with the transfer path.
//!
//! Chunks are fed in the order they were written to disk; the whole file is
//! never held in memory.

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Incremental MD5 over a sequence of byte chunks.
#[derive(Clone, Default)]
pub struct ChecksumStream {
    hasher: Md5,
    bytes: u64,
}

impl ChecksumStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk. Must be called in write order.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Consume the stream and return the digest as lowercase hex.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// MD5 of an in-memory buffer as lowercase hex.
pub fn md5_hex(data: &[u8]) -> String {
    let mut stream = ChecksumStream::new();
    stream.update(data);
    stream.finalize_hex()
}

/// Compute MD5 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn md5_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut stream = ChecksumStream::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        stream.update(&buf[..n]);
    }
    Ok(stream.finalize_hex())
}
