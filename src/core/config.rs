use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::normalize::DEFAULT_METRIC;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Seconds between automatic refreshes in watch mode.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Cost metric read from report totals and groups.
    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}
fn default_refresh_secs() -> u64 {
    300
}
fn default_metric() -> String {
    DEFAULT_METRIC.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
            refresh_secs: default_refresh_secs(),
            metric: default_metric(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint returning the full cost-report bundle.
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

fn default_primary_url() -> String {
    "http://localhost:8081/api/latest-data".to_string()
}
fn default_account() -> String {
    "account1".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            account: default_account(),
            timeout_secs: default_timeout_secs(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Where report files are listed and read from when the primary endpoint fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackConfig {
    /// `<base_url>/api/files?account=` index plus `<base_url>/api/file/<account>/<name>`.
    Http { base_url: String },
    /// Report files under `<path>/<account>/`.
    Dir { path: PathBuf },
    Disabled,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self::Http {
            base_url: "http://localhost:8081".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub source: SourceConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("costdash").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if self.settings.refresh_secs == 0 {
            issues.push("refresh_secs must be greater than 0".to_string());
        }
        if self.settings.metric.trim().is_empty() {
            issues.push("metric must not be empty".to_string());
        }
        if !is_http_url(&self.source.primary_url) {
            issues.push(format!(
                "Invalid primary_url: '{}' (must start with http:// or https://)",
                self.source.primary_url
            ));
        }
        if self.source.account.is_empty() || self.source.account.contains(['/', '\\']) {
            issues.push(format!(
                "Invalid account: '{}' (must be a single path segment)",
                self.source.account
            ));
        }
        if self.source.timeout_secs == 0 {
            issues.push("timeout_secs must be greater than 0".to_string());
        }
        if let FallbackConfig::Http { base_url } = &self.source.fallback {
            if !is_http_url(base_url) {
                issues.push(format!(
                    "Invalid fallback base_url: '{}' (must start with http:// or https://)",
                    base_url
                ));
            }
        }
        issues
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
