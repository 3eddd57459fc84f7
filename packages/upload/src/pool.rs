//! Fixed-width pool of upload workers sharing one work stream.

use std::sync::Arc;

use async_channel::Receiver;
use gcs_uploader_storage::UploadClient;
use tokio::task::{JoinError, JoinSet};

use crate::job::{UploadJob, transfer};
use crate::progress::ProgressCallback;
use crate::source::SourceFiles;
use crate::{ErrorCollector, assemble_blob_name};

/// Everything a worker needs, shared read-only by the whole pool.
pub struct WorkerContext {
    /// Destination storage.
    pub client: Arc<dyn UploadClient>,
    /// Where source bytes come from.
    pub sources: Arc<dyn SourceFiles>,
    /// Sink for failed source paths.
    pub collector: Arc<ErrorCollector>,
    /// Advanced once per finished job.
    pub progress: Arc<dyn ProgressCallback>,
    /// Destination bucket.
    pub bucket: String,
    /// Directory component of every object key.
    pub blob_prefix_path: String,
    /// Joined to each object name with a `-` when non-empty.
    pub blob_prefix_name: String,
}

impl WorkerContext {
    /// Uploads one job. A failure is logged and recorded, never returned.
    async fn process(&self, job: UploadJob) {
        let key = assemble_blob_name(&self.blob_prefix_path, &self.blob_prefix_name, &job.source);

        match transfer(
            self.sources.as_ref(),
            self.client.as_ref(),
            &self.bucket,
            &job.source,
            &key,
        )
        .await
        {
            Ok(size) => {
                log::debug!("Uploaded {} -> {key} ({size} bytes)", job.source.display());
            }
            Err(failure) => {
                log::debug!("Failed to upload {}: {failure}", job.source.display());
                self.collector.record_failure(job.source);
            }
        }
    }
}

/// `W` workers consuming the same stream until it is closed and empty.
///
/// Workers start idle. Each pulls a job, uploads it, and goes back for
/// another; nothing a job does can stop its worker.
pub struct WorkerPool {
    workers: JoinSet<u64>,
}

impl WorkerPool {
    /// Starts `width` workers on `jobs`. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn spawn(width: usize, jobs: &Receiver<UploadJob>, context: &Arc<WorkerContext>) -> Self {
        let mut workers = JoinSet::new();
        for id in 0..width {
            workers.spawn(run_worker(id, jobs.clone(), Arc::clone(context)));
        }
        log::debug!("Started {width} upload worker(s)");
        Self { workers }
    }

    /// Waits until every worker has exited, which happens once the stream
    /// is closed and drained. Returns the number of jobs processed.
    ///
    /// # Errors
    ///
    /// Returns the first worker [`JoinError`] (a panicked worker), after
    /// all the other workers have finished.
    pub async fn join(mut self) -> Result<u64, JoinError> {
        let mut processed = 0;
        let mut first_error = None;

        while let Some(result) = self.workers.join_next().await {
            match result {
                Ok(count) => processed += count,
                Err(e) => {
                    log::error!("Upload worker failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(processed), Err)
    }
}

async fn run_worker(id: usize, jobs: Receiver<UploadJob>, context: Arc<WorkerContext>) -> u64 {
    let mut processed = 0;
    while let Ok(job) = jobs.recv().await {
        context.process(job).await;
        context.progress.inc(1);
        processed += 1;
    }
    log::trace!("Worker {id} done after {processed} job(s)");
    processed
}
