//! User configuration
//!
//! Read from an optional TOML file; every field has a default so an empty or
//! missing file is valid. The CLI layers flags and environment variables on
//! top of whatever the file provides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogConfig, DEFAULT_API_URL, DEFAULT_IMAGE_HOST};
use crate::error::{Error, Result};

/// Trailing-edge delay applied to search-as-you-type input
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Value sent in the `user-key` header
    #[serde(default)]
    pub api_key: String,
    /// Base URL images are served from
    #[serde(default = "default_image_host")]
    pub image_host: String,
    /// Directory for persisted state. Defaults to the OS data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_image_host() -> String {
    DEFAULT_IMAGE_HOST.to_string()
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            image_host: default_image_host(),
            data_dir: None,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Default config file location
    /// - Linux: ~/.config/release-monitor/config.toml
    /// - macOS: ~/Library/Application Support/release-monitor/config.toml
    /// - Windows: %APPDATA%\release-monitor\config\config.toml
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "release-monitor")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parse a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_toml(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Directory holding persisted state (uses OS-appropriate default if not set)
    pub fn data_directory(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "release-monitor")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
