//! Client configuration.
//!
//! Configuration is loaded from multiple sources with the following priority:
//!
//! 1. `DOCKER_HOST` (`unix://` only) and `DOCKER_API_VERSION`
//! 2. Environment variables (`ARCBOX_CLIENT_*`, e.g. `ARCBOX_CLIENT_API_VERSION`)
//! 3. Configuration file (`~/.config/arcbox/client.toml`)
//! 4. Default values
//!
//! ## Example Configuration File
//!
//! ```toml
//! socket_path = "/var/run/docker.sock"
//! api_version = "1.43"
//! timeout_secs = 30
//!
//! [http_headers]
//! X-Request-Source = "ci"
//! ```

use crate::DEFAULT_API_VERSION;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Daemon Unix socket.
    pub socket_path: PathBuf,
    /// API version to speak. Empty means unversioned requests.
    pub api_version: String,
    /// Transport timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Extra headers sent with every request.
    pub http_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 60,
            user_agent: format!("arcbox-client/{}", env!("CARGO_PKG_VERSION")),
            http_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `socket_path` with all other defaults.
    pub fn with_socket(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Loads configuration from the user config file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(user_config_path())
    }

    /// Loads configuration from a specific file and the environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        let mut config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ARCBOX_CLIENT_").ignore(&["api_version"]))
            .extract()?;

        config.apply_env();
        Ok(config)
    }

    /// Returns the transport timeout, if enabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Applies the variables figment cannot carry verbatim.
    ///
    /// Versions are read raw: as a figment value `1.40` would become the
    /// float `1.4`.
    fn apply_env(&mut self) {
        for var in ["ARCBOX_CLIENT_API_VERSION", "DOCKER_API_VERSION"] {
            if let Ok(version) = std::env::var(var) {
                if !version.trim().is_empty() {
                    self.api_version = version.trim().to_string();
                }
            }
        }
        if let Ok(host) = std::env::var("DOCKER_HOST") {
            self.apply_docker_host(&host);
        }
    }

    fn apply_docker_host(&mut self, host: &str) {
        let host = host.trim();
        if host.is_empty() {
            return;
        }
        match host.strip_prefix("unix://") {
            Some(path) if !path.is_empty() => self.socket_path = PathBuf::from(path),
            _ => tracing::warn!("Ignoring unsupported DOCKER_HOST {:?}", host),
        }
    }
}

fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".arcbox")
        .join("docker.sock")
}

fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("arcbox")
        .join("client.toml")
}
