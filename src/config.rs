// Runtime configuration.
//
// Everything here has a default so hopla works without any configuration
// file. When present, `config.toml` overrides the defaults:
//
//     base_url = "https://habitica.com"
//     timeout_secs = 30
//
//     [rate_limit]
//     max_requests = 30
//     window_secs = 60
//     backoff_secs = 60

use crate::error::{HoplaError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted rate limit window: one day.
pub const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Largest pause after a 429, whether configured or sent by the server.
pub const MAX_BACKOFF_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Sent as the `x-client` header on every request.
    pub client_name: String,
    pub timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://habitica.com".into(),
            client_name: "hopla".into(),
            timeout_secs: 30,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Client side pacing parameters. Habitica currently documents 30 requests
/// per minute, but the server is the authority; adjust here if it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
    /// Pause after the server answers 429 without a `Retry-After` header.
    pub backoff_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 60,
            backoff_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(HoplaError::Config(
                "rate_limit.max_requests must be at least 1".into(),
            ));
        }
        if self.window_secs == 0 {
            return Err(HoplaError::Config(
                "rate_limit.window_secs must be at least 1".into(),
            ));
        }
        if self.window_secs > MAX_WINDOW_SECS {
            return Err(HoplaError::Config(format!(
                "rate_limit.window_secs must be at most {}",
                MAX_WINDOW_SECS
            )));
        }
        if self.backoff_secs > MAX_BACKOFF_SECS {
            return Err(HoplaError::Config(format!(
                "rate_limit.backoff_secs must be at most {}",
                MAX_BACKOFF_SECS
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load the configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| HoplaError::Config(format!("{}: {}", path.display(), e)))?;
        config.rate_limit.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn with_rate_limit_overrides(
        mut self,
        max_requests: Option<u32>,
        window_secs: Option<u64>,
    ) -> Result<Self> {
        if let Some(max) = max_requests {
            self.rate_limit.max_requests = max;
        }
        if let Some(window) = window_secs {
            self.rate_limit.window_secs = window;
        }
        self.rate_limit.validate()?;
        Ok(self)
    }
}

/// `$XDG_CONFIG_HOME/hopla`, or `~/.config/hopla` when that is unset. The
/// same location is used on every platform.
pub fn hopla_config_dir() -> PathBuf {
    let xdg = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    config_dir_from(xdg, dirs::home_dir())
}

fn config_dir_from(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    xdg_config_home
        .or_else(|| home.map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hopla")
}

/// Resolve the configuration file: explicit path first, then the default
/// location.
pub fn config_file(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| hopla_config_dir().join("config.toml"))
}
