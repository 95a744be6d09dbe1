//! Configuration module
//!
//! TOML configuration with per-section defaults, loaded from
//! `$ADMIN_GATEWAY_CONFIG` or `~/.config/admin-gateway/config.toml`.
//! Missing sections and fields fall back to their defaults, so a
//! partial file is always valid.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Proxy listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// The fixed backend origin requests are relayed to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Per-request timeout in seconds for both the proxy and the REST
    /// client.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Local session persistence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the session record file lives.
    pub file: PathBuf,
    /// Record lifetime in minutes, matching the backend token expiry.
    pub ttl_minutes: i64,
}

impl SessionConfig {
    /// Record lifetime as a duration, for constructing a
    /// [`crate::session::FileCredentialStore`].
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_path(),
            ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

fn config_root() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("admin-gateway")
}

/// `~/.config/admin-gateway/config.toml` (platform equivalent).
pub fn default_config_path() -> PathBuf {
    config_root().join("config.toml")
}

/// `~/.config/admin-gateway/session.json` (platform equivalent).
pub fn default_session_path() -> PathBuf {
    config_root().join("session.json")
}
