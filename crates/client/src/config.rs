//! Client configuration.
//!
//! Stored as TOML. Every field has a default, so an empty file is a valid
//! configuration pointing at the test environment:
//!
//! ```toml
//! base_url = "https://api.chino.io/"
//! api_version = "v1"
//! timeout_secs = 30
//! chunk_size = 12288
//! checkpoint_dir = "/var/lib/myapp/uploads"
//!
//! [auth]
//! customer_id = "..."
//! customer_key = "..."
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chino_protocol::constants::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::error::ApiError;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API host, with or without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version path segment appended to the host.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds (0 disables it).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Chunk size used by uploads that don't pass one explicitly.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Where upload checkpoints are written. Checkpointing is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Credentials as they appear in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    /// Customer key wins over an access token, which wins over a bearer token.
    pub fn credentials(&self) -> Option<Credentials> {
        if let (Some(id), Some(key)) = (&self.customer_id, &self.customer_key) {
            return Some(Credentials::customer(id.clone(), key.clone()));
        }
        if let Some(token) = &self.access_token {
            return Some(Credentials::AccessToken(token.clone()));
        }
        self.bearer_token.clone().map(Credentials::Bearer)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    chino_transfer::DEFAULT_CHUNK_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            chunk_size: default_chunk_size(),
            checkpoint_dir: None,
            auth: None,
        }
    }
}

impl ClientConfig {
    /// Parses a TOML document; absent fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ApiError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no upload could run with.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.chunk_size == 0 {
            return Err(ApiError::InvalidConfig("chunk_size must be positive".into()));
        }
        Ok(())
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;

        // May hold credentials: owner-only before any byte is written.
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(content.as_bytes())?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Host plus version, always ending in `/`.
    pub fn api_root(&self) -> Result<String, ApiError> {
        let base = self.base_url.trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(self.base_url.clone()));
        }
        if version.is_empty() {
            Ok(format!("{base}/"))
        } else {
            Ok(format!("{base}/{version}/"))
        }
    }

    /// Request timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Credentials from the `[auth]` table, if any.
    pub fn credentials(&self) -> Option<Credentials> {
        self.auth.as_ref().and_then(AuthConfig::credentials)
    }
}
