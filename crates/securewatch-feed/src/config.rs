//! Feed tuning knobs, read from the `[feed]` section of securewatch.toml.

use securewatch_common::{Result, SecureWatchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::freshness::FreshnessPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum alerts kept per feed
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Lower bound of the randomized arrival interval
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Upper bound of the randomized arrival interval
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// How long the "NEW" badge stays up
    #[serde(default = "default_fresh_ttl_ms")]
    pub fresh_ttl_ms: u64,

    #[serde(default)]
    pub freshness: FreshnessPolicy,

    /// Alerts pre-loaded when a feed opens; 0 starts empty
    #[serde(default = "default_seed_backlog")]
    pub seed_backlog: usize,

    /// Seed alerts are back-dated at random within this window
    #[serde(default = "default_seed_window_secs")]
    pub seed_window_secs: u64,
}

fn default_capacity()         -> usize { 50 }
fn default_min_interval_ms()  -> u64   { 5_000 }
fn default_max_interval_ms()  -> u64   { 15_000 }
fn default_fresh_ttl_ms()     -> u64   { 5_000 }
fn default_seed_backlog()     -> usize { 15 }
fn default_seed_window_secs() -> u64   { 3_600 }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            fresh_ttl_ms: default_fresh_ttl_ms(),
            freshness: FreshnessPolicy::default(),
            seed_backlog: default_seed_backlog(),
            seed_window_secs: default_seed_window_secs(),
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SecureWatchError::Config("feed.capacity must be at least 1".to_string()));
        }
        if self.min_interval_ms > self.max_interval_ms {
            return Err(SecureWatchError::Config(format!(
                "feed.min_interval_ms ({}) exceeds feed.max_interval_ms ({})",
                self.min_interval_ms, self.max_interval_ms
            )));
        }
        if self.max_interval_ms == 0 {
            return Err(SecureWatchError::Config("feed.max_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fresh_ttl(&self) -> Duration {
        Duration::from_millis(self.fresh_ttl_ms)
    }

    pub fn seed_window(&self) -> Duration {
        Duration::from_secs(self.seed_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_feed() {
        let config = FeedConfig::default();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.min_interval_ms, 5_000);
        assert_eq!(config.max_interval_ms, 15_000);
        assert_eq!(config.fresh_ttl(), Duration::from_secs(5));
        assert_eq!(config.freshness, FreshnessPolicy::Global);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let config = FeedConfig { min_interval_ms: 20_000, ..FeedConfig::default() };
        assert!(matches!(config.validate(), Err(SecureWatchError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = FeedConfig { capacity: 0, ..FeedConfig::default() };
        assert!(config.validate().is_err());
    }
}
