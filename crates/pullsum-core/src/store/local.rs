//! Object store backed by a local directory tree (`root/bucket/key`).

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use super::{ObjectStore, ObjectStream, StoreError};
use crate::catalog::safe_relative_path;

const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Serves objects from `root/<bucket>/<key>`; an empty bucket reads from `root`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    chunk_size: usize,
}

impl LocalStore {
    /// Fails if `root` is not an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("store root is not a directory: {}", root.display()),
            )));
        }
        Ok(Self {
            root,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Read size per chunk (minimum 1 byte).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        if !bucket.is_empty() {
            path.push(
                safe_relative_path(bucket).ok_or_else(|| StoreError::InvalidKey(bucket.to_string()))?,
            );
        }
        path.push(safe_relative_path(key).ok_or_else(|| StoreError::InvalidKey(key.to_string()))?);
        Ok(path)
    }
}

struct LocalObjectStream {
    file: tokio::fs::File,
    buf: Vec<u8>,
}

#[async_trait]
impl ObjectStream for LocalObjectStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        let n = self.file.read(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[..n].to_vec()))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn open_read_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn ObjectStream>, StoreError> {
        let path = self.object_path(bucket, key)?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;
        Ok(Box::new(LocalObjectStream {
            file,
            buf: vec![0u8; self.chunk_size],
        }))
    }
}
