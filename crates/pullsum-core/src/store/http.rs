//! HTTP object store: path-style GET of `{endpoint}/{bucket}/{key}` via libcurl.
//!
//! Each transfer runs on a blocking worker thread (curl's write callback is
//! synchronous) and hands body chunks to the async side through a bounded
//! channel, so a slow consumer back-pressures the socket instead of
//! buffering the object in memory.

use async_trait::async_trait;
use std::cell::Cell;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use super::{ObjectStore, ObjectStream, StoreError};

/// Chunks buffered between the curl thread and the reading task.
const CHANNEL_DEPTH: usize = 8;

/// Transport tuning for [`HttpStore`].
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// curl receive buffer size (None = libcurl default).
    pub buffer_size: Option<usize>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            buffer_size: None,
        }
    }
}

/// Object store reachable over plain HTTP(S) (public or presigned-by-proxy buckets,
/// S3-compatible gateways, static mirrors).
#[derive(Debug, Clone)]
pub struct HttpStore {
    endpoint: Url,
    options: HttpOptions,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        Self::with_options(endpoint, HttpOptions::default())
    }

    pub fn with_options(endpoint: &str, options: HttpOptions) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(endpoint.to_string()));
        }
        Ok(Self { endpoint, options })
    }

    /// URL of an object; each key segment is percent-encoded.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.endpoint.to_string()))?;
            segments.pop_if_empty();
            if !bucket.is_empty() {
                segments.push(bucket);
            }
            for part in key.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
        }
        Ok(url)
    }
}

/// Message from the curl worker to the reading task.
enum Frame {
    Chunk(Vec<u8>),
    End,
    Failed(StoreError),
}

struct HttpObjectStream {
    pending: Option<Vec<u8>>,
    rx: mpsc::Receiver<Frame>,
    finished: bool,
}

impl HttpObjectStream {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        if self.finished {
            return Ok(None);
        }
        match self.rx.recv().await {
            Some(Frame::Chunk(data)) => Ok(Some(data)),
            Some(Frame::End) => {
                self.finished = true;
                Ok(None)
            }
            Some(Frame::Failed(e)) => {
                self.finished = true;
                Err(e)
            }
            None => {
                self.finished = true;
                Err(StoreError::WorkerGone)
            }
        }
    }
}

#[async_trait]
impl ObjectStream for HttpObjectStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(data) = self.pending.take() {
            return Ok(Some(data));
        }
        self.recv().await
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    /// Waits for the first body chunk (or the error) so that HTTP status
    /// failures surface here, before the caller creates any local file.
    async fn open_read_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn ObjectStream>, StoreError> {
        let url = self.object_url(bucket, key)?;
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        let options = self.options;
        tracing::debug!(url = %url, "GET object");
        tokio::task::spawn_blocking(move || run_get(url.as_str(), options, tx));

        let mut stream = HttpObjectStream {
            pending: None,
            rx,
            finished: false,
        };
        stream.pending = stream.recv().await?;
        Ok(Box::new(stream))
    }
}

/// Blocking worker: performs the GET and always terminates the channel with
/// `End` or `Failed` unless the reader has gone away.
fn run_get(url: &str, options: HttpOptions, tx: mpsc::Sender<Frame>) {
    let frame = match perform_get(url, options, &tx) {
        Ok(true) => Frame::End,
        Ok(false) => return,
        Err(e) => Frame::Failed(e),
    };
    let _ = tx.blocking_send(frame);
}

/// Returns `Ok(false)` when the reader dropped the stream mid-transfer.
fn perform_get(url: &str, options: HttpOptions, tx: &mpsc::Sender<Frame>) -> Result<bool, StoreError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.low_speed_limit(options.low_speed_limit)?;
    easy.low_speed_time(options.low_speed_time)?;
    if let Some(sz) = options.buffer_size {
        easy.buffer_size(sz)?;
    }

    let status = Cell::new(0u32);
    let reader_gone = Cell::new(false);
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = parse_status_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            // Error bodies (and redirect bodies) are not object content.
            if !is_success(status.get()) {
                return Ok(data.len());
            }
            if tx.blocking_send(Frame::Chunk(data.to_vec())).is_err() {
                reader_gone.set(true);
                return Ok(0); // abort transfer
            }
            Ok(data.len())
        })?;
        if let Err(e) = transfer.perform() {
            if reader_gone.get() {
                return Ok(false);
            }
            return Err(StoreError::Curl(e));
        }
    }

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(StoreError::Http(code));
    }
    Ok(true)
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Status code from a response status line (`HTTP/1.1 200 OK`, `HTTP/2 404`).
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
