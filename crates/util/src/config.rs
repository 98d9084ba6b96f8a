//! Optional on-disk configuration for ghwf.
//!
//! The file is JSON and lives at `~/.config/ghwf/config.json` on most
//! platforms (or wherever `GHWF_CONFIG_PATH` points). Every field is optional;
//! environment variables take precedence over anything stored here.
//!
//! ```json
//! {
//!   "default_repo": "octo-org/hello-world",
//!   "hosts": {
//!     "ghe.example.com": { "token": "...", "api_base": "https://ghe.example.com/api/v3" }
//!   }
//! }
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "GHWF_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file exists but is not valid config JSON.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted CLI settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Repository used when neither `--repo` nor `GH_REPO` is set.
    #[serde(default)]
    pub default_repo: Option<String>,
    /// Per-host settings keyed by hostname.
    #[serde(default)]
    pub hosts: IndexMap<String, HostConfig>,
}

/// Settings for a single GitHub host.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// REST API root overriding the one derived from the hostname.
    #[serde(default)]
    pub api_base: Option<String>,
}

impl CliConfig {
    /// Load the config from the default location.
    ///
    /// A missing file yields the default config. Unreadable or malformed files
    /// are logged and ignored.
    pub fn load() -> Self {
        let path = default_config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Failed to read config file; using defaults");
                Self::default()
            }
        }
    }

    /// Load the config from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    /// Settings for `host`, matched case-insensitively.
    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        self.hosts
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(host))
            .map(|(_, config)| config)
    }

    /// Stored token for `host`, ignoring blank values.
    pub fn token_for(&self, host: &str) -> Option<&str> {
        self.host(host)
            .and_then(|config| config.token.as_deref())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Stored API root for `host`, ignoring blank values.
    pub fn api_base_for(&self, host: &str) -> Option<&str> {
        self.host(host)
            .and_then(|config| config.api_base.as_deref())
            .map(str::trim)
            .filter(|base| !base.is_empty())
    }
}

/// Get the default path for the config file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ghwf")
        .join(CONFIG_FILE_NAME)
}
