#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Object storage capability used by the batch uploader.
//!
//! The uploader only ever needs one thing from a storage backend: open a
//! writer for an object key in a bucket, push bytes into it, and close it.
//! That capability is the [`UploadClient`] / [`ObjectWriter`] pair. The
//! concrete binding is [`GcsClient`], built through [`open_client`] from one
//! of three [`AuthConfig`] strategies.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `STORAGE_EMULATOR_HOST` | No | Emulator address used by [`AuthConfig::Emulator`] when no explicit address is given (default `localhost:9023`) |

mod auth;
mod gcs;

pub use auth::{
    AuthConfig, DEFAULT_EMULATOR_HOST, EMULATOR_ENV_VAR, emulator_endpoint, open_client,
    resolve_emulator_host,
};
pub use gcs::{BucketAttrs, GcsClient};

use async_trait::async_trait;

/// Errors that can occur while talking to object storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A credential-backed strategy was selected without credentials.
    #[error("Auth type '{kind}' requires credentials")]
    MissingCredentials {
        /// Name of the selected strategy.
        kind: &'static str,
    },

    /// The client could not be built under the selected strategy.
    #[error("Failed to open storage client ({kind}): {source}")]
    Auth {
        /// Name of the selected strategy.
        kind: &'static str,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Writing to an object writer failed.
    #[error("Failed to write gs://{bucket}/{key}: {source}")]
    Write {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Closing an object writer (committing the upload) failed.
    #[error("Failed to upload gs://{bucket}/{key}: {source}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A bucket administration call failed.
    #[error("Failed to {operation} bucket {bucket}: {source}")]
    Bucket {
        /// What was attempted (e.g. "create").
        operation: &'static str,
        /// Bucket name.
        bucket: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Something that can hand out writers for object keys.
///
/// Implementations must be `Send + Sync` so a single client can be shared
/// by every upload worker behind an `Arc`.
pub trait UploadClient: Send + Sync {
    /// Opens a writer that will create (or overwrite) `key` in `bucket`.
    ///
    /// Nothing is sent until the writer is closed.
    fn open_writer(&self, bucket: &str, key: &str) -> Box<dyn ObjectWriter>;
}

/// A single in-progress object upload.
#[async_trait]
pub trait ObjectWriter: Send {
    /// Appends `bytes` to the object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the bytes cannot be accepted.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Commits the object. The writer is consumed either way.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Upload`] if the backend rejects the object.
    async fn close(self: Box<Self>) -> Result<(), StorageError>;
}
