//! Single-file upload. Unlike a batch, any failure ends the command.

use std::path::Path;

use gcs_uploader_storage::UploadClient;

use crate::job::transfer;
use crate::source::SourceFiles;
use crate::{ConfigError, UploadError};

/// Uploads `source_file` to `bucket` under exactly `blob_path`.
///
/// Returns the number of bytes uploaded.
///
/// # Errors
///
/// * [`UploadError::Config`] if the bucket or source file is empty
/// * [`UploadError::Job`] if any step of the upload fails
pub async fn load_file(
    client: &dyn UploadClient,
    sources: &dyn SourceFiles,
    bucket: &str,
    source_file: &Path,
    blob_path: &str,
) -> Result<usize, UploadError> {
    if bucket.is_empty() {
        return Err(ConfigError::MissingBucket.into());
    }
    if source_file.as_os_str().is_empty() {
        return Err(ConfigError::MissingSourceFile.into());
    }

    let size = transfer(sources, client, bucket, source_file, blob_path)
        .await
        .map_err(|failure| UploadError::Job {
            path: source_file.to_path_buf(),
            stage: failure.stage,
            source: failure.source,
        })?;

    log::info!("Blob created successfully: {blob_path} ({size} bytes)");

    Ok(size)
}

#[cfg(test)]
mod tests {
    use gcs_uploader_upload_models::JobStage;

    use super::*;
    use crate::LocalFiles;
    use crate::test_support::{MemoryClient, scratch_dir};

    #[tokio::test]
    async fn uploads_under_exact_blob_path() {
        let dir = scratch_dir("load_exact");
        let source = dir.join("report.json");
        std::fs::write(&source, "{}").unwrap();
        let client = MemoryClient::new();

        let size = load_file(&client, &LocalFiles, "bucket", &source, "a/b/c.json")
            .await
            .unwrap();

        assert_eq!(size, 2);
        assert_eq!(client.objects().get("bucket/a/b/c.json").unwrap(), b"{}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_source_is_fatal() {
        let dir = scratch_dir("load_missing");
        let err = load_file(
            &MemoryClient::new(),
            &LocalFiles,
            "bucket",
            &dir.join("nope"),
            "k",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Job {
                stage: JobStage::Open,
                ..
            }
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn empty_arguments_are_config_errors() {
        let client = MemoryClient::new();
        assert!(matches!(
            load_file(&client, &LocalFiles, "", Path::new("a"), "k").await,
            Err(UploadError::Config(ConfigError::MissingBucket))
        ));
        assert!(matches!(
            load_file(&client, &LocalFiles, "b", Path::new(""), "k").await,
            Err(UploadError::Config(ConfigError::MissingSourceFile))
        ));
    }
}
