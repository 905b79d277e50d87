//! Threat hunting desk on the threat-intelligence page.
//!
//! Queries are never parsed or executed against real data: a run sleeps for
//! the configured delay and returns the same canned matches. Saved queries
//! and the page's "last refresh" stamp live here as well.

use chrono::{DateTime, Utc};
use securewatch_common::{Result, SecureWatchError, Severity, Source};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info};

// ── Templates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryTemplate {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub query: &'static str,
}

pub const QUERY_TEMPLATES: [QueryTemplate; 5] = [
    QueryTemplate {
        value: "malware-detection",
        label: "Malware Detection",
        description: "Search for malware indicators across all sources",
        query: "source:* AND (malware OR virus OR trojan OR backdoor)\n\
                AND severity:(high OR critical)\n\
                AND timestamp:[now-24h TO now]",
    },
    QueryTemplate {
        value: "lateral-movement",
        label: "Lateral Movement",
        description: "Detect potential lateral movement activities",
        query: "event_type:authentication AND\n\
                (failed_login OR privilege_escalation OR unusual_access)\n\
                AND source_ip:internal AND destination_ip:internal",
    },
    QueryTemplate {
        value: "data-exfiltration",
        label: "Data Exfiltration",
        description: "Identify potential data exfiltration attempts",
        query: "(file_transfer OR data_upload OR large_download) AND\n\
                bytes_transferred:>100MB AND\n\
                destination_ip:external AND\n\
                time_of_day:(after_hours OR weekend)",
    },
    QueryTemplate {
        value: "apt-indicators",
        label: "APT Indicators",
        description: "Search for Advanced Persistent Threat indicators",
        query: "(persistence_mechanism OR command_control OR steganography)\n\
                AND duration:>1h AND\n\
                source:(Elastic OR Trellix) AND\n\
                confidence:>0.8",
    },
    QueryTemplate {
        value: "vulnerability-exploit",
        label: "Vulnerability Exploitation",
        description: "Find active vulnerability exploitation attempts",
        query: "event_type:exploit AND\n\
                (CVE-* OR zero_day OR unpatched) AND\n\
                success:true AND\n\
                target_system:production",
    },
];

pub fn template(value: &str) -> Result<&'static QueryTemplate> {
    QUERY_TEMPLATES
        .iter()
        .find(|t| t.value == value)
        .ok_or_else(|| SecureWatchError::NotFound(format!("query template '{value}'")))
}

// ── Results ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HuntMatch {
    pub id: u32,
    pub timestamp: &'static str,
    pub source: Source,
    pub event_type: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub affected_assets: &'static [&'static str],
    pub confidence: f64,
}

/// Every run returns these, whatever the query says.
pub const CANNED_MATCHES: [HuntMatch; 3] = [
    HuntMatch {
        id: 1,
        timestamp: "2025-01-20 20:45:23",
        source: Source::Elastic,
        event_type: "malware_detection",
        severity: Severity::Critical,
        description: "Trojan.Win32.Agent detected on workstation WS-001",
        affected_assets: &["WS-001", "192.168.1.45"],
        confidence: 0.95,
    },
    HuntMatch {
        id: 2,
        timestamp: "2025-01-20 20:42:15",
        source: Source::Trellix,
        event_type: "malware_detection",
        severity: Severity::High,
        description: "Suspicious PowerShell execution with encoded commands",
        affected_assets: &["SRV-DB-01", "10.0.1.25"],
        confidence: 0.87,
    },
    HuntMatch {
        id: 3,
        timestamp: "2025-01-20 20:38:47",
        source: Source::Defender,
        event_type: "malware_detection",
        severity: Severity::Medium,
        description: "Potentially unwanted application (PUA) blocked",
        affected_assets: &["WS-045", "192.168.1.78"],
        confidence: 0.72,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct HuntRun {
    pub query: String,
    pub matches: Vec<HuntMatch>,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedQuery {
    pub id: u64,
    pub name: String,
    pub query: String,
    pub created: DateTime<Utc>,
    /// Matches of the latest run when the query was saved.
    pub results_count: usize,
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,
    /// Auto-refresh period of the page's "last refresh" stamp
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_query_delay_ms()        -> u64 { 2000 }
fn default_refresh_interval_secs() -> u64 { 15 * 60 }

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            query_delay_ms: default_query_delay_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl HuntConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

// ── Desk ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct DeskState {
    saved: Vec<SavedQuery>,
    last_results: usize,
    last_refresh: DateTime<Utc>,
}

pub struct HuntingDesk {
    config: HuntConfig,
    state: RwLock<DeskState>,
}

impl HuntingDesk {
    pub fn new(config: HuntConfig) -> Self {
        Self {
            config,
            state: RwLock::new(DeskState {
                saved: Vec::new(),
                last_results: 0,
                last_refresh: Utc::now(),
            }),
        }
    }

    /// Run a hunt. A blank query is rejected before the delay.
    pub async fn run(&self, query: &str) -> Result<HuntRun> {
        let query = non_blank(query)?;
        debug!(query = %query, "Running threat hunt");

        sleep(Duration::from_millis(self.config.query_delay_ms)).await;
        let matches = CANNED_MATCHES.to_vec();
        self.state.write().await.last_results = matches.len();

        info!(matches = matches.len(), "Threat hunt finished");
        Ok(HuntRun { query: query.to_string(), matches, executed_at: Utc::now() })
    }

    /// Store `query` as "Query N".
    pub async fn save(&self, query: &str) -> Result<SavedQuery> {
        let query = non_blank(query)?;
        let mut state = self.state.write().await;
        let n = state.saved.len() + 1;
        let saved = SavedQuery {
            id: n as u64,
            name: format!("Query {n}"),
            query: query.to_string(),
            created: Utc::now(),
            results_count: state.last_results,
        };
        state.saved.push(saved.clone());
        info!(name = %saved.name, "Hunt query saved");
        Ok(saved)
    }

    pub async fn saved(&self) -> Vec<SavedQuery> {
        self.state.read().await.saved.clone()
    }

    pub async fn last_refresh(&self) -> DateTime<Utc> {
        self.state.read().await.last_refresh
    }

    /// Manual or periodic refresh of the page stamp.
    pub async fn refresh(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.state.write().await.last_refresh = now;
        now
    }
}

fn non_blank(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SecureWatchError::InvalidFilter("hunt query is empty".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_lookup() {
        assert_eq!(template("apt-indicators").unwrap().label, "APT Indicators");
        assert!(matches!(template("ransomware"), Err(SecureWatchError::NotFound(_))));
    }

    #[test]
    fn test_template_queries_keep_line_breaks() {
        let lateral = template("lateral-movement").unwrap();
        assert_eq!(lateral.query.lines().count(), 3);
        assert!(lateral.query.lines().nth(1).unwrap().starts_with("(failed_login"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_then_returns_canned_matches() {
        let desk = HuntingDesk::new(HuntConfig::default());
        let started = tokio::time::Instant::now();
        let run = desk.run("  severity:critical ").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(run.query, "severity:critical");
        assert_eq!(run.matches.len(), 3);
        assert_eq!(run.matches[0].severity, Severity::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_rejected_without_delay() {
        let desk = HuntingDesk::new(HuntConfig::default());
        let started = tokio::time::Instant::now();
        assert!(matches!(desk.run(" \n ").await, Err(SecureWatchError::InvalidFilter(_))));
        assert!(desk.save("").await.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_queries_numbered_with_last_result_count() {
        let desk = HuntingDesk::new(HuntConfig::default());
        let first = desk.save("malware").await.unwrap();
        assert_eq!(first.name, "Query 1");
        assert_eq!(first.results_count, 0);

        desk.run("malware").await.unwrap();
        let second = desk.save("malware AND severity:high").await.unwrap();
        assert_eq!(second.name, "Query 2");
        assert_eq!(second.results_count, 3);

        let saved = desk.saved().await;
        assert_eq!(saved, vec![first, second]);
    }

    #[test]
    fn test_refresh_moves_stamp_forward() {
        let desk = HuntingDesk::new(HuntConfig::default());
        let before = tokio_test::block_on(desk.last_refresh());
        let after = tokio_test::block_on(desk.refresh());
        assert!(after >= before);
        assert_eq!(tokio_test::block_on(desk.last_refresh()), after);
    }
}
