//! Google Cloud Storage binding of [`UploadClient`], plus the bucket
//! administration calls the CLI exposes.

use async_trait::async_trait;
use google_cloud_storage::client::Client;
use google_cloud_storage::http::Error as HttpError;
use google_cloud_storage::http::buckets::delete::DeleteBucketRequest;
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::buckets::insert::{InsertBucketParam, InsertBucketRequest};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

use crate::{ObjectWriter, StorageError, UploadClient};

/// Bucket resource returned by [`GcsClient::bucket_attrs`].
pub use google_cloud_storage::http::buckets::Bucket as BucketAttrs;

/// Storage client backed by Google Cloud Storage (or its emulator).
#[derive(Clone)]
pub struct GcsClient {
    client: Client,
}

impl GcsClient {
    pub(crate) const fn new(client: Client) -> Self {
        Self { client }
    }

    // ── Bucket administration ───────────────────────────────────────

    /// Creates `bucket` under `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Bucket`] if the bucket cannot be created.
    pub async fn create_bucket(&self, bucket: &str, project_id: &str) -> Result<(), StorageError> {
        log::info!("Creating bucket {bucket} in project {project_id}");

        let request = InsertBucketRequest {
            name: bucket.to_string(),
            param: InsertBucketParam {
                project: project_id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        self.client
            .insert_bucket(&request)
            .await
            .map_err(|e| bucket_error("create", bucket, e))?;

        Ok(())
    }

    /// Deletes `bucket`. The bucket must be empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Bucket`] if the bucket cannot be deleted.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        log::info!("Deleting bucket {bucket}");

        let request = DeleteBucketRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        self.client
            .delete_bucket(&request)
            .await
            .map_err(|e| bucket_error("delete", bucket, e))
    }

    /// Fetches the bucket resource.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Bucket`] if the bucket does not exist or
    /// cannot be read.
    pub async fn bucket_attrs(&self, bucket: &str) -> Result<BucketAttrs, StorageError> {
        let request = GetBucketRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        self.client
            .get_bucket(&request)
            .await
            .map_err(|e| bucket_error("read", bucket, e))
    }

    /// Whether `bucket` exists.
    ///
    /// A `404` is not an error here, it means `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Bucket`] on any other failure.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        let request = GetBucketRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        match self.client.get_bucket(&request).await {
            Ok(_) => Ok(true),
            Err(HttpError::Response(response)) if response.code == 404 => Ok(false),
            Err(e) => Err(bucket_error("read", bucket, e)),
        }
    }
}

impl std::fmt::Debug for GcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsClient").finish_non_exhaustive()
    }
}

impl UploadClient for GcsClient {
    fn open_writer(&self, bucket: &str, key: &str) -> Box<dyn ObjectWriter> {
        Box::new(GcsWriter {
            client: self.client.clone(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            buffer: Vec::new(),
        })
    }
}

/// Buffers written bytes and sends them as one simple upload on close.
struct GcsWriter {
    client: Client,
    bucket: String,
    key: String,
    buffer: Vec<u8>,
}

#[async_trait]
impl ObjectWriter for GcsWriter {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StorageError> {
        let Self {
            client,
            bucket,
            key,
            buffer,
        } = *self;

        let size = buffer.len();
        let request = UploadObjectRequest {
            bucket: bucket.clone(),
            ..Default::default()
        };
        let upload_type = UploadType::Simple(Media::new(key.clone()));

        client
            .upload_object(&request, buffer, &upload_type)
            .await
            .map_err(|e| StorageError::Upload {
                bucket: bucket.clone(),
                key: key.clone(),
                source: Box::new(e),
            })?;

        log::debug!("uploaded gs://{bucket}/{key} ({size} bytes)");
        Ok(())
    }
}

fn bucket_error(operation: &'static str, bucket: &str, source: HttpError) -> StorageError {
    StorageError::Bucket {
        operation,
        bucket: bucket.to_string(),
        source: Box::new(source),
    }
}
