//! Configuration loading for SecureWatch.
//! Reads securewatch.toml from the current directory or the path in the
//! SECUREWATCH_CONFIG env var. Every section is optional.

use securewatch_common::{Result, SecureWatchError};
use securewatch_feed::FeedConfig;
use securewatch_intel::{HuntConfig, ProbeConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "SECUREWATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "securewatch.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub integrations: ProbeConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub hunting: HuntConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host()       -> String { "127.0.0.1".to_string() }
fn default_port()       -> u16    { 3001 }
fn default_static_dir() -> String { concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SecureWatchError::Config(format!("invalid bind address: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// SOC connection indicator redraw period
    #[serde(default = "default_connection_period_secs")]
    pub connection_period_secs: u64,
    /// Threat timeline live nudge period
    #[serde(default = "default_timeline_tick_secs")]
    pub timeline_tick_secs: u64,
}

fn default_connection_period_secs() -> u64 { 30 }
fn default_timeline_tick_secs()     -> u64 { 5 }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            connection_period_secs: default_connection_period_secs(),
            timeline_tick_secs: default_timeline_tick_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn connection_period(&self) -> Duration {
        Duration::from_secs(self.connection_period_secs)
    }

    pub fn timeline_tick(&self) -> Duration {
        Duration::from_secs(self.timeline_tick_secs)
    }
}


impl Config {
    /// Load configuration from securewatch.toml.
    /// A path given through SECUREWATCH_CONFIG must exist; a missing default
    /// file falls back to built-in defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from(&path, true),
            Err(_) => Self::load_from(DEFAULT_CONFIG_PATH, false),
        }
    }

    pub fn load_from(path: &str, required: bool) -> Result<Self> {
        if !Path::new(path).exists() {
            if required {
                return Err(SecureWatchError::Config(format!(
                    "Config file not found: {path}\n\
                     Copy securewatch.example.toml to securewatch.toml and edit it."
                )));
            }
            warn!(path = %path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SecureWatchError::Config(format!("reading {path}: {e}")))?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SecureWatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;
        self.server.socket_addr()?;
        if self.monitor.connection_period_secs == 0 || self.monitor.timeline_tick_secs == 0 {
            return Err(SecureWatchError::Config("monitor periods must be non-zero".into()));
        }
        if self.hunting.refresh_interval_secs == 0 {
            return Err(SecureWatchError::Config("hunting.refresh_interval_secs must be non-zero".into()));
        }
        Ok(())
    }
}
