//! Maps the `--auth-type` / `--credentials` pair onto an [`AuthConfig`].

use std::path::PathBuf;

use clap::ValueEnum;
use gcs_uploader_storage::{AuthConfig, StorageError};

/// How the storage client authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthType {
    /// Local emulator, no credentials. `--credentials` is the emulator
    /// address; `STORAGE_EMULATOR_HOST` is used when it is absent.
    Emulator,
    /// `--credentials` is the path to a service account key file.
    File,
    /// `--credentials` is the service account key JSON itself.
    Json,
}

/// Builds the auth strategy for the selected type.
///
/// # Errors
///
/// Returns [`StorageError::MissingCredentials`] if `file` or `json` is
/// selected without credentials.
pub fn auth_config(
    auth_type: AuthType,
    credentials: Option<String>,
) -> Result<AuthConfig, StorageError> {
    let credentials = credentials.filter(|c| !c.is_empty());

    match (auth_type, credentials) {
        (AuthType::Emulator, address) => Ok(AuthConfig::Emulator { address }),
        (AuthType::File, Some(path)) => Ok(AuthConfig::CredentialsFile {
            path: PathBuf::from(path),
        }),
        (AuthType::Json, Some(json)) => Ok(AuthConfig::CredentialsJson { json }),
        (AuthType::File, None) => Err(StorageError::MissingCredentials { kind: "file" }),
        (AuthType::Json, None) => Err(StorageError::MissingCredentials { kind: "json" }),
    }
}
