#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch upload configuration, phase, and summary types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default number of concurrent upload workers.
pub const DEFAULT_WORKERS: usize = 32;

/// File name of the failure dump written into the dump directory.
pub const ERRORS_LOG_FILE: &str = "errors.log";

/// Everything a batch upload needs, bound once before the batch starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Destination bucket.
    pub bucket_name: String,
    /// Root directory that is walked for source files.
    pub search_path: PathBuf,
    /// Only files whose base name starts with this are uploaded. Empty
    /// matches everything.
    pub source_prefix: String,
    /// Directory component prepended to every object key.
    pub blob_prefix_path: String,
    /// Optional prefix joined to each object name with a `-`. Empty means
    /// no prefix.
    pub blob_prefix_name: String,
    /// Fixed worker pool width.
    pub workers: usize,
    /// Whether failed paths are dumped to [`ERRORS_LOG_FILE`] after the run.
    pub track_failures: bool,
    /// Directory the failure dump is written to.
    pub dump_dir: PathBuf,
}

impl UploadConfig {
    /// Creates a config for `bucket_name` rooted at `search_path` with every
    /// other option at its default.
    #[must_use]
    pub fn new(bucket_name: impl Into<String>, search_path: impl Into<PathBuf>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            search_path: search_path.into(),
            source_prefix: String::new(),
            blob_prefix_path: String::new(),
            blob_prefix_name: String::new(),
            workers: DEFAULT_WORKERS,
            track_failures: false,
            dump_dir: PathBuf::from("."),
        }
    }

    /// Sets the filename prefix filter.
    #[must_use]
    pub fn with_source_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.source_prefix = prefix.into();
        self
    }

    /// Sets the object key directory component.
    #[must_use]
    pub fn with_blob_prefix_path(mut self, prefix: impl Into<String>) -> Self {
        self.blob_prefix_path = prefix.into();
        self
    }

    /// Sets the object name prefix.
    #[must_use]
    pub fn with_blob_prefix_name(mut self, prefix: impl Into<String>) -> Self {
        self.blob_prefix_name = prefix.into();
        self
    }

    /// Sets the worker pool width.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enables the failure dump into `dump_dir`.
    #[must_use]
    pub fn with_failure_dump(mut self, dump_dir: impl Into<PathBuf>) -> Self {
        self.track_failures = true;
        self.dump_dir = dump_dir.into();
        self
    }
}

/// Lifecycle of a single batch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchPhase {
    /// Nothing started yet.
    Idle,
    /// Config validated, workers being spawned.
    PoolStarting,
    /// Discovery is producing while workers consume.
    Running,
    /// Work stream closed, waiting on workers.
    Draining,
    /// Every worker joined after a clean discovery pass.
    Completed,
    /// Terminal: configuration was rejected before any worker started.
    ConfigError,
    /// Terminal: discovery aborted; whatever was queued still drained.
    DiscoveryFailed,
}

/// The per-item step at which a job failed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStage {
    /// Opening the source file.
    Open,
    /// Reading the source content.
    Read,
    /// Closing the source file.
    Close,
    /// Writing content to the object writer.
    Write,
    /// Closing the object writer, which commits the upload.
    Finalize,
}

/// Derived result of a batch: total emitted and how many of those failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Number of jobs discovery emitted.
    pub total: u64,
    /// Number of jobs that ended in a recorded failure.
    pub failed: u64,
}

impl BatchSummary {
    /// Creates a summary from the emitted total and the failure count.
    #[must_use]
    pub const fn new(total: u64, failed: u64) -> Self {
        Self { total, failed }
    }

    /// Jobs that were uploaded.
    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.total.saturating_sub(self.failed)
    }

    /// Failed jobs as a percentage of the total. `0.0` for an empty batch.
    #[must_use]
    pub fn failed_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // display-only percentage
        let pct = self.failed as f64 / self.total as f64 * 100.0;
        pct
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed ({:.2}% failed) - total {}",
            self.succeeded(),
            self.failed,
            self.failed_percentage(),
            self.total
        )
    }
}

/// What the failure dump did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DumpOutcome {
    /// The dump file was (over)written.
    Written {
        /// Location of the dump file.
        path: PathBuf,
        /// Number of lines written.
        entries: usize,
    },
    /// No failures were recorded, so nothing was written.
    NoFailures,
}

impl std::fmt::Display for DumpOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Written { path, entries } => {
                write!(f, "{entries} failed path(s) written to {}", path.display())
            }
            Self::NoFailures => write!(f, "no failures"),
        }
    }
}
