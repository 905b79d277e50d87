//! External platform integrations and their simulated connection tests.
//!
//! No remote system is contacted. A probe sleeps for the configured delay
//! and then rolls a status.

use chrono::{DateTime, Utc};
use rand::Rng;
use securewatch_common::{Result, SecureWatchError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Connected,
    Warning,
    Disconnected,
}

impl IntegrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Connected    => "connected",
            IntegrationStatus::Warning      => "warning",
            IntegrationStatus::Disconnected => "disconnected",
        }
    }

    pub fn dot_class(&self) -> &'static str {
        match self {
            IntegrationStatus::Connected    => "dot-success",
            IntegrationStatus::Warning      => "dot-warning",
            IntegrationStatus::Disconnected => "dot-danger",
        }
    }

    /// Single-connection test outcome.
    pub fn from_probe_roll(roll: f64) -> Self {
        if roll > 0.6 {
            IntegrationStatus::Connected
        } else {
            IntegrationStatus::Warning
        }
    }

    /// Bulk test outcome, which can also come back disconnected.
    pub fn from_bulk_rolls(first: f64, second: f64) -> Self {
        if first > 0.7 {
            IntegrationStatus::Connected
        } else if second > 0.5 {
            IntegrationStatus::Warning
        } else {
            IntegrationStatus::Disconnected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Integration {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub status: IntegrationStatus,
    pub last_tested: Option<DateTime<Utc>>,
}

fn default_integrations() -> Vec<Integration> {
    let entry = |id, name, description, status| Integration {
        id,
        name,
        description,
        status,
        last_tested: None,
    };
    vec![
        entry(
            "microsoft-defender",
            "Microsoft Defender",
            "Microsoft Defender ATP integration",
            IntegrationStatus::Disconnected,
        ),
        entry(
            "tenable",
            "Tenable",
            "Tenable Vulnerability Management integration",
            IntegrationStatus::Connected,
        ),
        entry(
            "elastic-search",
            "Elastic Search",
            "Elastic Search SIEM integration",
            IntegrationStatus::Warning,
        ),
        entry(
            "trellix-ips",
            "Trellix IPS",
            "Trellix Intrusion Prevention System integration",
            IntegrationStatus::Disconnected,
        ),
    ]
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_delay_ms")]
    pub probe_delay_ms: u64,
    #[serde(default = "default_probe_all_step_ms")]
    pub probe_all_step_ms: u64,
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
}

fn default_probe_delay_ms() -> u64 { 2000 }
fn default_probe_all_step_ms() -> u64 { 1500 }
fn default_save_delay_ms() -> u64 { 1000 }

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            probe_delay_ms: default_probe_delay_ms(),
            probe_all_step_ms: default_probe_all_step_ms(),
            save_delay_ms: default_save_delay_ms(),
        }
    }
}

// ── Board ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub connected: usize,
    pub warning: usize,
    pub disconnected: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
struct BoardState {
    integrations: Vec<Integration>,
    last_saved: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub integrations: Vec<Integration>,
    pub counts: StatusCounts,
    pub testing_all: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

pub struct IntegrationBoard {
    config: ProbeConfig,
    state: RwLock<BoardState>,
    testing_all: AtomicBool,
}

/// Marks a bulk test as running. The flag is cleared on drop, so a sweep
/// that fails or is cancelled mid-way does not block later runs.
struct BulkRun<'a>(&'a AtomicBool);

impl<'a> BulkRun<'a> {
    fn begin(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BulkRun(flag))
            .map_err(|_| SecureWatchError::Conflict("bulk connection test already running".into()))
    }
}

impl Drop for BulkRun<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl IntegrationBoard {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            state: RwLock::new(BoardState {
                integrations: default_integrations(),
                ..BoardState::default()
            }),
            testing_all: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let state = self.state.read().await;
        BoardSnapshot {
            counts: count(&state.integrations),
            integrations: state.integrations.clone(),
            testing_all: self.testing_all.load(Ordering::Acquire),
            last_saved: state.last_saved,
        }
    }

    pub async fn status(&self, id: &str) -> Result<IntegrationStatus> {
        let state = self.state.read().await;
        state
            .integrations
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.status)
            .ok_or_else(|| not_found(id))
    }

    pub async fn status_counts(&self) -> StatusCounts {
        count(&self.state.read().await.integrations)
    }

    /// Test one connection. The id is checked before the delay so an
    /// unknown integration fails fast.
    pub async fn probe<R: Rng + Send>(&self, id: &str, rng: &mut R) -> Result<IntegrationStatus> {
        self.status(id).await?;
        debug!(integration = %id, "Testing connection");

        sleep(Duration::from_millis(self.config.probe_delay_ms)).await;
        let status = IntegrationStatus::from_probe_roll(rng.gen::<f64>());
        self.set_status(id, status).await?;

        info!(integration = %id, status = status.as_str(), "Connection test finished");
        Ok(status)
    }

    /// Test every connection in order, one step delay before each.
    pub async fn probe_all<R: Rng + Send>(&self, rng: &mut R) -> Result<Vec<(String, IntegrationStatus)>> {
        let _run = BulkRun::begin(&self.testing_all)?;
        let ids: Vec<&'static str> = self.state.read().await.integrations.iter().map(|i| i.id).collect();

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            sleep(Duration::from_millis(self.config.probe_all_step_ms)).await;
            let status = IntegrationStatus::from_bulk_rolls(rng.gen::<f64>(), rng.gen::<f64>());
            self.set_status(id, status).await?;
            results.push((id.to_string(), status));
        }

        info!(tested = results.len(), "Bulk connection test finished");
        Ok(results)
    }

    pub async fn save(&self) -> DateTime<Utc> {
        sleep(Duration::from_millis(self.config.save_delay_ms)).await;
        let saved = Utc::now();
        self.state.write().await.last_saved = Some(saved);
        info!("Integration configuration saved");
        saved
    }

    async fn set_status(&self, id: &str, status: IntegrationStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let integration = state
            .integrations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found(id))?;
        integration.status = status;
        integration.last_tested = Some(Utc::now());
        Ok(())
    }
}

fn count(integrations: &[Integration]) -> StatusCounts {
    let of = |s: IntegrationStatus| integrations.iter().filter(|i| i.status == s).count();
    StatusCounts {
        connected: of(IntegrationStatus::Connected),
        warning: of(IntegrationStatus::Warning),
        disconnected: of(IntegrationStatus::Disconnected),
        total: integrations.len(),
    }
}

fn not_found(id: &str) -> SecureWatchError {
    SecureWatchError::NotFound(format!("integration '{id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_initial_counts() {
        let board = IntegrationBoard::new(ProbeConfig::default());
        let counts = tokio_test::block_on(board.status_counts());
        assert_eq!(
            counts,
            StatusCounts { connected: 1, warning: 1, disconnected: 2, total: 4 }
        );
    }

    #[test]
    fn test_roll_thresholds() {
        assert_eq!(IntegrationStatus::from_probe_roll(0.61), IntegrationStatus::Connected);
        assert_eq!(IntegrationStatus::from_probe_roll(0.6), IntegrationStatus::Warning);
        assert_eq!(IntegrationStatus::from_bulk_rolls(0.71, 0.0), IntegrationStatus::Connected);
        assert_eq!(IntegrationStatus::from_bulk_rolls(0.7, 0.51), IntegrationStatus::Warning);
        assert_eq!(IntegrationStatus::from_bulk_rolls(0.2, 0.5), IntegrationStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_waits_for_delay() {
        let board = Arc::new(IntegrationBoard::new(ProbeConfig::default()));
        let started = tokio::time::Instant::now();
        let status = board
            .probe("microsoft-defender", &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_ne!(status, IntegrationStatus::Disconnected);
        assert_eq!(board.status("microsoft-defender").await.unwrap(), status);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_unknown_id() {
        let board = IntegrationBoard::new(ProbeConfig::default());
        let err = board.probe("splunk", &mut StdRng::seed_from_u64(1)).await.unwrap_err();
        assert!(matches!(err, SecureWatchError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_all_is_sequential() {
        let board = IntegrationBoard::new(ProbeConfig::default());
        let started = tokio::time::Instant::now();
        let results = board.probe_all(&mut StdRng::seed_from_u64(7)).await.unwrap();
        assert_eq!(results.len(), 4);
        assert!(started.elapsed() >= Duration::from_millis(4 * 1500));
        assert!(!board.snapshot().await.testing_all);
        assert_eq!(board.status_counts().await.total, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_bulk_test_conflicts() {
        let board = Arc::new(IntegrationBoard::new(ProbeConfig::default()));
        let running = {
            let board = board.clone();
            tokio::spawn(async move { board.probe_all(&mut StdRng::seed_from_u64(2)).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(board.snapshot().await.testing_all);

        let err = board.probe_all(&mut StdRng::seed_from_u64(3)).await.unwrap_err();
        assert!(matches!(err, SecureWatchError::Conflict(_)));
        assert!(running.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_bulk_test_releases_flag() {
        let board = Arc::new(IntegrationBoard::new(ProbeConfig::default()));
        let running = {
            let board = board.clone();
            tokio::spawn(async move { board.probe_all(&mut StdRng::seed_from_u64(4)).await })
        };
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(board.snapshot().await.testing_all);

        // Same as the HTTP client going away mid-sweep
        running.abort();
        assert!(running.await.unwrap_err().is_cancelled());
        assert!(!board.snapshot().await.testing_all);

        let results = board.probe_all(&mut StdRng::seed_from_u64(5)).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_stamps_last_saved() {
        let board = IntegrationBoard::new(ProbeConfig::default());
        assert!(board.snapshot().await.last_saved.is_none());
        let saved = board.save().await;
        assert_eq!(board.snapshot().await.last_saved, Some(saved));
    }
}
