//! Up-front validation of an [`UploadConfig`].

use gcs_uploader_upload_models::UploadConfig;

use crate::ConfigError;

/// Rejects a config that cannot start a batch.
///
/// # Errors
///
/// * [`ConfigError::MissingBucket`] if the bucket name is empty
/// * [`ConfigError::MissingSearchPath`] if the search path is empty
/// * [`ConfigError::NoWorkers`] if the pool width is zero
pub fn validate(config: &UploadConfig) -> Result<(), ConfigError> {
    if config.bucket_name.is_empty() {
        return Err(ConfigError::MissingBucket);
    }
    if config.search_path.as_os_str().is_empty() {
        return Err(ConfigError::MissingSearchPath);
    }
    if config.workers == 0 {
        return Err(ConfigError::NoWorkers);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complete_config() {
        assert!(validate(&UploadConfig::new("bucket", ".")).is_ok());
    }

    #[test]
    fn rejects_missing_bucket() {
        assert!(matches!(
            validate(&UploadConfig::new("", ".")),
            Err(ConfigError::MissingBucket)
        ));
    }

    #[test]
    fn rejects_missing_search_path() {
        assert!(matches!(
            validate(&UploadConfig::new("bucket", "")),
            Err(ConfigError::MissingSearchPath)
        ));
    }

    #[test]
    fn rejects_zero_workers() {
        assert!(matches!(
            validate(&UploadConfig::new("bucket", ".").with_workers(0)),
            Err(ConfigError::NoWorkers)
        ));
    }
}
