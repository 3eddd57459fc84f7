use std::path::PathBuf;

use gcs_uploader_storage::StorageError;
use gcs_uploader_upload_models::JobStage;

/// Configuration that cannot start a batch.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No bucket name was given.
    #[error("Specify a bucket name")]
    MissingBucket,

    /// No search path was given.
    #[error("Specify a search path")]
    MissingSearchPath,

    /// No source file was given for a single-file load.
    #[error("Specify a source file")]
    MissingSourceFile,

    /// The worker pool would have no workers.
    #[error("Worker count must be at least 1")]
    NoWorkers,
}

/// Discovery stopped before the whole tree was walked.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Walking the tree failed (e.g. an unreadable directory).
    #[error("Failed to walk {}: {source}", root.display())]
    Walk {
        /// Root of the walk.
        root: PathBuf,
        /// Files emitted before the failure.
        emitted: u64,
        /// Underlying traversal error.
        source: walkdir::Error,
    },

    /// Every worker went away, so nothing could receive more jobs.
    #[error("Work stream closed after {emitted} file(s)")]
    StreamClosed {
        /// Files emitted before the stream closed.
        emitted: u64,
    },
}

impl DiscoveryError {
    /// Number of files handed to workers before discovery stopped.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        match self {
            Self::Walk { emitted, .. } | Self::StreamClosed { emitted } => *emitted,
        }
    }
}

/// Errors that end an upload command.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The configuration was rejected before anything started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The storage client could not be built or used.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A single-file load failed at `stage`.
    #[error("Failed to load {} ({stage}): {source}", path.display())]
    Job {
        /// Source file.
        path: PathBuf,
        /// Step that failed.
        stage: JobStage,
        /// Underlying error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The failure dump could not be written.
    #[error("Failed to write failure dump to {}: {source}", path.display())]
    Dump {
        /// Dump directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A worker or the discovery task panicked.
    #[error("Upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
