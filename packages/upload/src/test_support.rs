//! In-memory doubles shared by the unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gcs_uploader_storage::{ObjectWriter, StorageError, UploadClient};

use crate::progress::ProgressCallback;
use crate::source::{SourceFiles, SourceReader};

/// Fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gcs_uploader_test_{name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Object store that keeps every committed object in memory, keyed by
/// `bucket/key`.
#[derive(Default)]
pub struct MemoryClient {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    reject_keys: HashSet<String>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the commit of `key` fail.
    pub fn rejecting(mut self, key: &str) -> Self {
        self.reject_keys.insert(key.to_string());
        self
    }

    pub fn objects(&self) -> BTreeMap<String, Vec<u8>> {
        self.objects.lock().unwrap().clone()
    }
}

impl UploadClient for MemoryClient {
    fn open_writer(&self, bucket: &str, key: &str) -> Box<dyn ObjectWriter> {
        Box::new(MemoryWriter {
            objects: Arc::clone(&self.objects),
            bucket: bucket.to_string(),
            key: key.to_string(),
            reject: self.reject_keys.contains(key),
            buffer: Vec::new(),
        })
    }
}

struct MemoryWriter {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    bucket: String,
    key: String,
    reject: bool,
    buffer: Vec<u8>,
}

#[async_trait]
impl ObjectWriter for MemoryWriter {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StorageError> {
        if self.reject {
            return Err(StorageError::Upload {
                bucket: self.bucket,
                key: self.key,
                source: "rejected by test".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{}/{}", self.bucket, self.key), self.buffer);
        Ok(())
    }
}

/// Source files served from memory, with per-path read failures and a
/// gauge of how many reads are in flight at once.
#[derive(Default)]
pub struct MemorySources {
    files: HashMap<PathBuf, Vec<u8>>,
    failing_reads: HashSet<PathBuf>,
    gauge: Arc<Gauge>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        self.files.insert(path.into(), bytes.to_vec());
        self
    }

    pub fn failing_read(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.files.entry(path.clone()).or_default();
        self.failing_reads.insert(path);
        self
    }

    /// Highest number of reads that were in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFiles for MemorySources {
    async fn open(&self, path: &Path) -> io::Result<Box<dyn SourceReader>> {
        let bytes = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        Ok(Box::new(MemoryReader {
            bytes,
            fail: self.failing_reads.contains(path),
            gauge: Arc::clone(&self.gauge),
        }))
    }
}

#[derive(Default)]
struct Gauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

struct MemoryReader {
    bytes: Vec<u8>,
    fail: bool,
    gauge: Arc<Gauge>,
}

#[async_trait]
impl SourceReader for MemoryReader {
    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let active = self.gauge.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(active, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.gauge.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(io::Error::other("injected read failure"));
        }
        Ok(std::mem::take(&mut self.bytes))
    }

    async fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

/// Progress sink that remembers what it was told.
#[derive(Default)]
pub struct RecordingProgress {
    pub total: AtomicU64,
    pub done: AtomicU64,
    pub messages: Mutex<Vec<String>>,
    pub finished: Mutex<Option<String>>,
}

impl ProgressCallback for RecordingProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn inc(&self, delta: u64) {
        self.done.fetch_add(delta, Ordering::SeqCst);
    }

    fn set_message(&self, msg: String) {
        self.messages.lock().unwrap().push(msg);
    }

    fn finish(&self, msg: String) {
        *self.finished.lock().unwrap() = Some(msg);
    }
}
