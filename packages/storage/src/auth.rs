//! Authentication strategies and the single dispatch that turns one into a
//! [`GcsClient`].

use std::path::PathBuf;

use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::client::{Client, ClientConfig};

use crate::{GcsClient, StorageError};

/// Environment variable consulted for the emulator address.
pub const EMULATOR_ENV_VAR: &str = "STORAGE_EMULATOR_HOST";

/// Emulator address used when neither an explicit address nor
/// [`EMULATOR_ENV_VAR`] is set.
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:9023";

/// How the storage client authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Talk to a local emulator without credentials.
    Emulator {
        /// Emulator address. Falls back to [`EMULATOR_ENV_VAR`], then
        /// [`DEFAULT_EMULATOR_HOST`].
        address: Option<String>,
    },
    /// Service account key read from a file.
    CredentialsFile {
        /// Path to the JSON key file.
        path: PathBuf,
    },
    /// Service account key passed inline.
    CredentialsJson {
        /// Raw JSON key content.
        json: String,
    },
}

impl AuthConfig {
    /// Short strategy name used in logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Emulator { .. } => "emulator",
            Self::CredentialsFile { .. } => "file",
            Self::CredentialsJson { .. } => "json",
        }
    }
}

impl std::fmt::Display for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emulator { address } => match address {
                Some(address) => write!(f, "emulator at {address}"),
                None => write!(f, "emulator"),
            },
            Self::CredentialsFile { path } => write!(f, "credentials file {}", path.display()),
            // Never print the key material.
            Self::CredentialsJson { .. } => write!(f, "inline JSON credentials"),
        }
    }
}

/// Picks the emulator host: an explicit non-empty address wins, then a
/// non-empty `env_value`, then [`DEFAULT_EMULATOR_HOST`].
#[must_use]
pub fn resolve_emulator_host(explicit: Option<&str>, env_value: Option<String>) -> String {
    if let Some(address) = explicit.filter(|a| !a.is_empty()) {
        return address.to_string();
    }

    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => {
            log::warn!("No emulator address found at {EMULATOR_ENV_VAR}");
            log::info!("Emulator storage expected on {DEFAULT_EMULATOR_HOST}");
            DEFAULT_EMULATOR_HOST.to_string()
        }
    }
}

/// Turns an emulator host into a storage endpoint URL. Hosts that already
/// carry a scheme are passed through.
#[must_use]
pub fn emulator_endpoint(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Builds a storage client under the given strategy.
///
/// # Errors
///
/// Returns [`StorageError::Auth`] if the credentials cannot be loaded or the
/// client configuration cannot be built.
pub async fn open_client(auth: &AuthConfig) -> Result<GcsClient, StorageError> {
    let kind = auth.kind();
    let auth_err = |e: Box<dyn std::error::Error + Send + Sync>| StorageError::Auth {
        kind,
        source: e,
    };

    let config = match auth {
        AuthConfig::Emulator { address } => {
            let host = resolve_emulator_host(
                address.as_deref(),
                std::env::var(EMULATOR_ENV_VAR).ok(),
            );
            let endpoint = emulator_endpoint(&host);
            log::info!("Using storage emulator at {endpoint}");

            let mut config = ClientConfig::default().anonymous();
            config.storage_endpoint = endpoint;
            config
        }
        AuthConfig::CredentialsFile { path } => {
            log::debug!("Loading credentials from {}", path.display());
            let credentials = CredentialsFile::new_from_file(path.to_string_lossy().into_owned())
                .await
                .map_err(|e| auth_err(Box::new(e)))?;
            ClientConfig::default()
                .with_credentials(credentials)
                .await
                .map_err(|e| auth_err(Box::new(e)))?
        }
        AuthConfig::CredentialsJson { json } => {
            log::debug!("Loading inline JSON credentials ({} bytes)", json.len());
            let credentials = CredentialsFile::new_from_str(json)
                .await
                .map_err(|e| auth_err(Box::new(e)))?;
            ClientConfig::default()
                .with_credentials(credentials)
                .await
                .map_err(|e| auth_err(Box::new(e)))?
        }
    };

    Ok(GcsClient::new(Client::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_emulator_address_wins() {
        let host = resolve_emulator_host(Some("10.0.0.5:4443"), Some("env:1".to_string()));
        assert_eq!(host, "10.0.0.5:4443");
    }

    #[test]
    fn env_emulator_address_used_when_no_explicit() {
        assert_eq!(
            resolve_emulator_host(None, Some("env-host:9000".to_string())),
            "env-host:9000"
        );
        assert_eq!(
            resolve_emulator_host(Some(""), Some("env-host:9000".to_string())),
            "env-host:9000"
        );
    }

    #[test]
    fn default_emulator_address_when_unset() {
        assert_eq!(resolve_emulator_host(None, None), DEFAULT_EMULATOR_HOST);
        assert_eq!(
            resolve_emulator_host(None, Some(String::new())),
            DEFAULT_EMULATOR_HOST
        );
    }

    #[test]
    fn endpoint_gets_scheme() {
        assert_eq!(emulator_endpoint("localhost:9023"), "http://localhost:9023");
        assert_eq!(
            emulator_endpoint("https://storage.local/"),
            "https://storage.local"
        );
    }

    #[test]
    fn display_hides_inline_json() {
        let auth = AuthConfig::CredentialsJson {
            json: r#"{"private_key":"secret"}"#.to_string(),
        };
        assert!(!auth.to_string().contains("secret"));
        assert_eq!(auth.kind(), "json");
    }

    #[tokio::test]
    async fn missing_credentials_file_is_auth_error() {
        let auth = AuthConfig::CredentialsFile {
            path: std::env::temp_dir().join("gcs_uploader_no_such_key.json"),
        };
        let err = open_client(&auth).await.err();
        assert!(matches!(err, Some(StorageError::Auth { kind: "file", .. })));
    }

    #[tokio::test]
    async fn malformed_inline_json_is_auth_error() {
        let auth = AuthConfig::CredentialsJson {
            json: "not json".to_string(),
        };
        let err = open_client(&auth).await.err();
        assert!(matches!(err, Some(StorageError::Auth { kind: "json", .. })));
    }
}
