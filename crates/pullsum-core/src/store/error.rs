//! Object store error type.

/// Error from an object store backend. Classified by the retry policy to
/// decide whether opening a stream is worth another attempt.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
    /// The blocking transfer worker exited without finishing the body.
    #[error("transfer worker stopped before end of stream")]
    WorkerGone,
}
