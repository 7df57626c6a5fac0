//! Object store client abstraction.
//!
//! The engine never speaks a storage protocol itself: it asks an
//! [`ObjectStore`] for a chunked read stream per object and for manifest text.
//! Implementations must be shareable across concurrent transfer tasks.

mod error;
mod http;
mod local;

use async_trait::async_trait;

pub use error::StoreError;
pub use http::{HttpOptions, HttpStore};
pub use local::LocalStore;

/// Sequential reader over one object's bytes.
#[async_trait]
pub trait ObjectStream: Send {
    /// Next chunk in object order, or `None` at end of stream.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Read access to objects addressed by `(bucket, key)`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn open_read_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn ObjectStream>, StoreError>;

    /// Whole object as text (invalid UTF-8 is replaced). Used for manifests.
    async fn read_text(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        let mut stream = self.open_read_stream(bucket, key).await?;
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
