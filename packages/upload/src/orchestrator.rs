//! Batch lifecycle: validate, start the pool, discover, drain, summarize.

use std::path::PathBuf;
use std::sync::Arc;

use gcs_uploader_storage::UploadClient;
use gcs_uploader_upload_models::{BatchPhase, BatchSummary, DumpOutcome, UploadConfig};

use crate::config::validate;
use crate::discover::discover;
use crate::pool::{WorkerContext, WorkerPool};
use crate::progress::ProgressCallback;
use crate::source::{LocalFiles, SourceFiles};
use crate::{DiscoveryError, ErrorCollector, UploadError};

/// Outcome of a batch that got past configuration.
#[derive(Debug)]
pub struct BatchReport {
    /// `Completed` or `DiscoveryFailed`.
    pub phase: BatchPhase,
    pub summary: BatchSummary,
    /// Every failed source path, in recording order.
    pub failures: Vec<PathBuf>,
    /// Set when failure tracking was enabled.
    pub dump: Option<DumpOutcome>,
    /// Why discovery stopped early, if it did. The summary then only counts
    /// the files emitted before the failure.
    pub discovery_error: Option<DiscoveryError>,
}

impl BatchReport {
    /// Whether the whole tree was walked.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, BatchPhase::Completed)
    }
}

/// Drives one batch upload.
///
/// ```text
/// Idle ─▶ PoolStarting ─▶ Running ─▶ Draining ─▶ Completed
///   │                        │
///   └─▶ ConfigError          └─▶ (walk failed) Draining ─▶ DiscoveryFailed
/// ```
pub struct Orchestrator {
    config: UploadConfig,
    client: Arc<dyn UploadClient>,
    sources: Arc<dyn SourceFiles>,
    phase: BatchPhase,
}

impl Orchestrator {
    /// Creates an orchestrator reading sources from the local filesystem.
    #[must_use]
    pub fn new(config: UploadConfig, client: Arc<dyn UploadClient>) -> Self {
        Self {
            config,
            client,
            sources: Arc::new(LocalFiles),
            phase: BatchPhase::Idle,
        }
    }

    /// Replaces where source bytes are read from.
    #[must_use]
    pub fn with_source_files(mut self, sources: Arc<dyn SourceFiles>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> BatchPhase {
        self.phase
    }

    /// Runs the batch to completion.
    ///
    /// Individual upload failures never fail the run; they land in the
    /// report. A discovery failure still drains every job already handed
    /// to workers and returns a report in phase `DiscoveryFailed`.
    ///
    /// # Errors
    ///
    /// * [`UploadError::Config`] if the config is rejected (phase
    ///   `ConfigError`, nothing started)
    /// * [`UploadError::Task`] if a worker or the discovery thread panicked
    /// * [`UploadError::Dump`] if the failure dump could not be written
    pub async fn run(
        &mut self,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<BatchReport, UploadError> {
        if let Err(e) = validate(&self.config) {
            self.transition(BatchPhase::ConfigError, progress.as_ref());
            return Err(e.into());
        }

        self.transition(BatchPhase::PoolStarting, progress.as_ref());
        let collector = Arc::new(ErrorCollector::new());
        let context = Arc::new(WorkerContext {
            client: Arc::clone(&self.client),
            sources: Arc::clone(&self.sources),
            collector: Arc::clone(&collector),
            progress: Arc::clone(&progress),
            bucket: self.config.bucket_name.clone(),
            blob_prefix_path: self.config.blob_prefix_path.clone(),
            blob_prefix_name: self.config.blob_prefix_name.clone(),
        });
        let (tx, rx) = async_channel::bounded(1);
        let pool = WorkerPool::spawn(self.config.workers, &rx, &context);
        drop(rx);

        self.transition(BatchPhase::Running, progress.as_ref());
        let root = self.config.search_path.clone();
        let prefix = self.config.source_prefix.clone();
        let discovery_tx = tx.clone();
        let discovery =
            tokio::task::spawn_blocking(move || discover(&root, &prefix, &discovery_tx)).await;
        tx.close();

        let (total, discovery_error) = match discovery {
            Ok(Ok(total)) => (total, None),
            Ok(Err(e)) => {
                log::error!("Discovery stopped: {e}");
                (e.emitted(), Some(e))
            }
            Err(e) => {
                pool.join().await?;
                return Err(e.into());
            }
        };
        progress.set_total(total);
        log::info!("Sent {total} files to {} workers", self.config.workers);

        self.transition(BatchPhase::Draining, progress.as_ref());
        let processed = pool.join().await?;
        debug_assert_eq!(processed, total);

        let summary = BatchSummary::new(total, collector.count() as u64);
        log::info!("Done loading {summary}");

        self.transition(
            if discovery_error.is_some() {
                BatchPhase::DiscoveryFailed
            } else {
                BatchPhase::Completed
            },
            progress.as_ref(),
        );
        progress.finish(summary.to_string());

        let dump = if self.config.track_failures {
            let dir = &self.config.dump_dir;
            Some(collector.dump(dir).map_err(|source| UploadError::Dump {
                path: dir.clone(),
                source,
            })?)
        } else {
            None
        };

        Ok(BatchReport {
            phase: self.phase,
            summary,
            failures: collector.snapshot(),
            dump,
            discovery_error,
        })
    }

    fn transition(&mut self, next: BatchPhase, progress: &dyn ProgressCallback) {
        log::debug!("Batch phase {} -> {next}", self.phase);
        self.phase = next;
        progress.set_message(phase_label(next));
    }
}

/// `POOL_STARTING` -> `pool starting`.
fn phase_label(phase: BatchPhase) -> String {
    phase.as_ref().to_lowercase().replace('_', " ")
}
