//! A single file upload, from open to finalize.

use std::path::{Path, PathBuf};

use gcs_uploader_storage::UploadClient;
use gcs_uploader_upload_models::JobStage;

use crate::source::SourceFiles;

/// One discovered source file waiting for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Path of the file as found by the walk, i.e. already joined with the
    /// search root. This is both what gets opened and what gets recorded on
    /// failure.
    pub source: PathBuf,
}

impl UploadJob {
    /// Creates a job for the walked path `source`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// A job that stopped at `stage`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct JobFailure {
    /// Step that failed.
    pub stage: JobStage,
    /// Underlying error.
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl JobFailure {
    fn at(stage: JobStage, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Copies `source_path` into `bucket` under `key`.
///
/// Steps run strictly in order: open, read the whole file, close it, open
/// an object writer, write, finalize. The first failing step ends the job.
/// Returns the number of bytes uploaded.
///
/// # Errors
///
/// Returns a [`JobFailure`] naming the step that failed.
pub async fn transfer(
    sources: &dyn SourceFiles,
    client: &dyn UploadClient,
    bucket: &str,
    source_path: &Path,
    key: &str,
) -> Result<usize, JobFailure> {
    let mut reader = sources
        .open(source_path)
        .await
        .map_err(|e| JobFailure::at(JobStage::Open, e))?;

    let bytes = match reader.read_all().await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = reader.close().await;
            return Err(JobFailure::at(JobStage::Read, e));
        }
    };

    reader
        .close()
        .await
        .map_err(|e| JobFailure::at(JobStage::Close, e))?;

    let mut writer = client.open_writer(bucket, key);
    writer
        .write(&bytes)
        .await
        .map_err(|e| JobFailure::at(JobStage::Write, e))?;
    writer
        .close()
        .await
        .map_err(|e| JobFailure::at(JobStage::Finalize, e))?;

    Ok(bytes.len())
}
