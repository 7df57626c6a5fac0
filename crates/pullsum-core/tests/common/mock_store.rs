//! In-memory object store with latency, failure injection and an in-flight gauge.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pullsum_core::store::{ObjectStore, ObjectStream, StoreError};

#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

/// Keeps the gauge raised from the start of an open until the stream drops.
struct InFlight(Arc<Gauge>);

impl InFlight {
    fn enter(gauge: &Arc<Gauge>) -> Self {
        let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.max.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(gauge))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockStore {
    objects: HashMap<String, Vec<u8>>,
    chunk_size: usize,
    chunk_delay: Duration,
    open_delay: Duration,
    /// Keys whose open fails with HTTP 500.
    failing: Mutex<HashSet<String>>,
    /// Keys whose open panics.
    panicking: HashSet<String>,
    /// Keys whose stream fails after this many chunks.
    failing_after: HashMap<String, usize>,
    gauge: Arc<Gauge>,
    opens: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            chunk_size: 4,
            ..Self::default()
        }
    }

    pub fn object(mut self, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(key.to_string(), body.into());
        self
    }

    pub fn chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn failing(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(key.to_string());
        self
    }

    /// Time spent inside every open, before it succeeds or fails.
    pub fn open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    /// The stream for `key` yields `chunks` chunks, then a connection reset.
    pub fn failing_after(mut self, key: &str, chunks: usize) -> Self {
        self.failing_after.insert(key.to_string(), chunks);
        self
    }

    pub fn panicking(mut self, key: &str) -> Self {
        self.panicking.insert(key.to_string());
        self
    }

    /// Lets a previously failing key succeed from now on.
    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn max_in_flight(&self) -> usize {
        self.gauge.max.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.gauge.current.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

struct MockStream {
    data: Vec<u8>,
    pos: usize,
    chunk_size: usize,
    delay: Duration,
    chunks_left: Option<usize>,
    _in_flight: InFlight,
}

#[async_trait]
impl ObjectStream for MockStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(left) = self.chunks_left.as_mut() {
            if *left == 0 {
                return Err(StoreError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "mock connection reset",
                )));
            }
            *left -= 1;
        }
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(Some(chunk))
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn open_read_stream(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Box<dyn ObjectStream>, StoreError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let in_flight = InFlight::enter(&self.gauge);
        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }
        if self.panicking.contains(key) {
            panic!("mock store panic for {}", key);
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(StoreError::Http(500));
        }
        let data = self
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(Box::new(MockStream {
            data,
            pos: 0,
            chunk_size: self.chunk_size.max(1),
            delay: self.chunk_delay,
            chunks_left: self.failing_after.get(key).copied(),
            _in_flight: in_flight,
        }))
    }
}
