//! Configuration loaded from `~/.config/streamseek/config.toml`.
//!
//! Every field is optional; a missing file means defaults.
//!
//! ```toml
//! proxy_url = "https://proxy.example/"
//! request_timeout_secs = 15
//! disabled_providers = ["netfilm"]
//!
//! [netfilm]
//! base_url = "https://net-film.vercel.app"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fetch::{ProxiedClient, DEFAULT_TIMEOUT};
use crate::providers::netfilm::NETFILM_BASE_URL;

/// NetFilm provider settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetFilmConfig {
    pub base_url: String,
}

impl Default for NetFilmConfig {
    fn default() -> Self {
        Self {
            base_url: NETFILM_BASE_URL.to_string(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Indirection proxy; upstream URLs go in its `destination` parameter.
    pub proxy_url: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Provider ids to leave out of the registry.
    pub disabled_providers: Vec<String>,
    pub netfilm: NetFilmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: None,
            disabled_providers: Vec::new(),
            netfilm: NetFilmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn is_disabled(&self, provider_id: &str) -> bool {
        self.disabled_providers
            .iter()
            .any(|id| id.eq_ignore_ascii_case(provider_id))
    }

    /// Build the fetch client described by this configuration.
    pub fn fetch_client(&self) -> Result<ProxiedClient> {
        let mut builder = ProxiedClient::builder()
            .proxy_url(self.proxy_url.clone())
            .default_timeout(self.request_timeout());
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        builder.build().context("failed to build HTTP client")
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("streamseek")
        .join("config.toml")
}
