#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{Result, StorageError};
use crate::utils::validation::{validate_non_empty, validate_url};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_FOLDER: &str = "uploads";

pub const ENV_BASE_URL: &str = "BLOBGATE_BASE_URL";
pub const ENV_FOLDER: &str = "BLOBGATE_FOLDER";
pub const ENV_API_TOKEN: &str = "BLOBGATE_API_TOKEN";

/// Immutable gateway client configuration, fixed at adapter construction.
///
/// The base URL is normalized exactly once here: trailing slashes are
/// trimmed so endpoint composition never doubles them, and a `localhost`
/// host is rewritten to `127.0.0.1` because local name resolution can
/// stall for seconds on some setups. Past construction the normalization
/// is invisible to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    base_url: String,
    folder: String,
    api_token: Option<String>,
}

impl StorageConfig {
    pub fn new(
        base_url: impl Into<String>,
        folder: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let folder = folder.into();

        validate_url("base_url", &base_url)?;
        validate_non_empty("folder", &folder)?;

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            folder,
            api_token: api_token.filter(|t| !t.is_empty()),
        })
    }

    /// Ambient configuration: `BLOBGATE_BASE_URL`, `BLOBGATE_FOLDER` and
    /// `BLOBGATE_API_TOKEN`, each falling back to the local-development
    /// default when unset.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let folder = std::env::var(ENV_FOLDER).unwrap_or_else(|_| DEFAULT_FOLDER.to_string());
        let api_token = std::env::var(ENV_API_TOKEN).ok();

        Self::new(base_url, folder, api_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Already in normalized form, so no parsing can fail here.
        Self {
            base_url: "http://127.0.0.1:4000/api".to_string(),
            folder: DEFAULT_FOLDER.to_string(),
            api_token: None,
        }
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let mut url = Url::parse(base_url).map_err(|e| StorageError::InvalidConfigValueError {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    if url.host_str() == Some("localhost") {
        url.set_host(Some("127.0.0.1"))
            .map_err(|e| StorageError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: format!("Failed to rewrite loopback host: {}", e),
            })?;
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
