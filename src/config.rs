//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the lunar-config.toml file.
//! It provides a centralized way to configure the astronomy API, the default observer,
//! terminal output and the response cache.
//!
//! API credentials are never compiled in. They come from the config file or from the
//! `ASTRONOMY_APP_ID` / `ASTRONOMY_APP_SECRET` environment variables, which win.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "lunar-config.toml";

const ENV_APP_ID: &str = "ASTRONOMY_APP_ID";
const ENV_APP_SECRET: &str = "ASTRONOMY_APP_SECRET";

/// Application configuration loaded from lunar-config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Astronomy service configuration
    pub api: ApiConfig,
    /// Observer used when no location is given
    pub observer: ObserverConfig,
    /// Terminal output configuration
    pub display: DisplayConfig,
    /// Response cache configuration
    pub cache: CacheConfig,
}

/// Astronomy API endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. "https://api.astronomyapi.com/api/v2/"
    pub base_url: String,
    /// Application ID for HTTP basic auth
    pub app_id: String,
    /// Application secret for HTTP basic auth
    pub app_secret: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

/// Default observer location
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Place name passed to the geocoder
    pub location: String,
    /// Fallback latitude when geocoding is unavailable
    pub latitude: f64,
    /// Fallback longitude when geocoding is unavailable
    pub longitude: f64,
}

/// Terminal output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width of the terminal in characters
    pub terminal_width: usize,
    /// Whether to use ANSI colour codes
    pub enable_color: bool,
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache TTL in minutes
    pub ttl_minutes: u64,
    /// JSON file the cache persists to between runs
    pub path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://api.astronomyapi.com/api/v2/".to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            location: "Los Angeles, CA".to_string(),
            latitude: 34.0522,
            longitude: -118.2437,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            terminal_width: 80,
            enable_color: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_minutes: 60,
            // /tmp is cleared on reboot
            path: "/tmp/lunar_cache.json".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.app_secret.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }
}

impl Config {
    /// Load configuration from lunar-config.toml, then apply environment overrides
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE).with_env_overrides()
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Replace credentials with `ASTRONOMY_APP_ID` / `ASTRONOMY_APP_SECRET` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::var(ENV_APP_ID).ok(), env::var(ENV_APP_SECRET).ok())
    }

    fn with_overrides(mut self, app_id: Option<String>, app_secret: Option<String>) -> Self {
        if let Some(id) = app_id.filter(|v| !v.trim().is_empty()) {
            self.api.app_id = id.trim().to_string();
        }
        if let Some(secret) = app_secret.filter(|v| !v.trim().is_empty()) {
            self.api.app_secret = secret.trim().to_string();
        }
        self
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
