//! Runtime configuration for the client.
//!
//! Credentials identify the client application to the backend, not the
//! visitor. They always come from the command line or the environment.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const IDENTITY_DIR: &str = "lpbd";
const IDENTITY_FILE: &str = "anonymous_id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Timeout must be at least one second")]
    InvalidTimeout,

    #[error("No data directory available; pass --identity-file")]
    NoDataDir,
}

/// Basic-auth credential pair for the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Always ends with `/` so endpoint paths can be joined onto it.
    pub base_url: Url,
    pub credentials: Credentials,
    pub identity_file: PathBuf,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        identity_file: Option<PathBuf>,
        timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let identity_file = match identity_file {
            Some(path) => path,
            None => default_identity_file()?,
        };
        Ok(Self {
            base_url,
            credentials,
            identity_file,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `<local data dir>/lpbd/anonymous_id`
pub fn default_identity_file() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(IDENTITY_DIR).join(IDENTITY_FILE))
        .ok_or(ConfigError::NoDataDir)
}
