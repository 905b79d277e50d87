//! "Top 10 Security Events" table: one tab of mock events per source.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use securewatch_common::{Result, SecureWatchError, Severity, Source};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const EVENTS_PER_SOURCE: usize = 10;

const ANALYSTS: [&str; 5] = ["Sarah Chen", "Mike Rodriguez", "Alex Thompson", "Lisa Park", "David Kim"];

fn event_types(source: Source) -> [&'static str; 4] {
    match source {
        Source::Elastic  => ["Log Analysis Alert", "Anomaly Detection", "Search Query Alert", "Index Monitoring"],
        Source::Trellix  => ["Malware Detection", "Network Intrusion", "Email Security", "Endpoint Protection"],
        Source::Defender => ["ATP Alert", "Identity Protection", "Cloud Security", "Device Compliance"],
        Source::Tenable  => ["Vulnerability Scan", "Asset Discovery", "Compliance Check", "Risk Assessment"],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Open,
    Investigating,
    Resolved,
    FalsePositive,
}

impl EventStatus {
    const ALL: [EventStatus; 4] = [
        EventStatus::Open,
        EventStatus::Investigating,
        EventStatus::Resolved,
        EventStatus::FalsePositive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Open          => "Open",
            EventStatus::Investigating => "Investigating",
            EventStatus::Resolved      => "Resolved",
            EventStatus::FalsePositive => "False Positive",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            EventStatus::Open          => "badge-danger",
            EventStatus::Investigating => "badge-warning",
            EventStatus::Resolved      => "badge-success",
            EventStatus::FalsePositive => "badge-outline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityEvent {
    pub id: String,
    pub event_type: &'static str,
    pub severity: Severity,
    pub status: EventStatus,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    pub affected_assets: u32,
    pub assigned_to: Option<&'static str>,
    pub risk_score: u32,
}

// ── Sorting ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSortKey {
    Timestamp,
    Severity,
    RiskScore,
    AffectedAssets,
}

impl FromStr for EventSortKey {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp"                            => Ok(EventSortKey::Timestamp),
            "severity"                             => Ok(EventSortKey::Severity),
            "risk_score" | "riskscore"             => Ok(EventSortKey::RiskScore),
            "affected_assets" | "affectedassets"   => Ok(EventSortKey::AffectedAssets),
            other => Err(SecureWatchError::InvalidFilter(format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc"  => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other  => Err(SecureWatchError::InvalidFilter(format!("unknown sort direction '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: EventSortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self { key: EventSortKey::Timestamp, direction: SortDirection::Desc }
    }
}

impl SortConfig {
    /// Column header click: the active ascending column flips to descending,
    /// anything else starts ascending.
    pub fn toggled(self, key: EventSortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }

    fn compare(&self, a: &SecurityEvent, b: &SecurityEvent) -> Ordering {
        let ord = match self.key {
            EventSortKey::Timestamp      => a.timestamp.cmp(&b.timestamp),
            EventSortKey::Severity       => a.severity.cmp(&b.severity),
            EventSortKey::RiskScore      => a.risk_score.cmp(&b.risk_score),
            EventSortKey::AffectedAssets => a.affected_assets.cmp(&b.affected_assets),
        };
        match self.direction {
            SortDirection::Asc  => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EventsTable {
    by_source: BTreeMap<Source, Vec<SecurityEvent>>,
}

impl EventsTable {
    pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let by_source = Source::ALL
            .iter()
            .map(|source| (*source, generate_events(*source, now, rng)))
            .collect();
        Self { by_source }
    }

    pub fn tab_len(&self, source: Source) -> usize {
        self.by_source.get(&source).map_or(0, Vec::len)
    }

    /// Rows of one source tab, severity-filtered and sorted. A disabled
    /// source's tab has no rows.
    pub fn rows(
        &self,
        source: Source,
        source_enabled: bool,
        severity: Option<Severity>,
        sort: SortConfig,
    ) -> Vec<&SecurityEvent> {
        if !source_enabled {
            return Vec::new();
        }
        let mut rows: Vec<&SecurityEvent> = self
            .by_source
            .get(&source)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| severity.map_or(true, |s| e.severity == s))
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }
}

fn generate_events<R: Rng>(source: Source, now: DateTime<Utc>, rng: &mut R) -> Vec<SecurityEvent> {
    let types = event_types(source);
    let week_ms = ChronoDuration::days(7).num_milliseconds();

    (0..EVENTS_PER_SOURCE)
        .map(|i| SecurityEvent {
            id: format!("{}-{}-{}", source, now.timestamp_millis(), i),
            event_type: types.choose(rng).copied().unwrap_or(types[0]),
            severity: Severity::ALL.choose(rng).copied().unwrap_or(Severity::Low),
            status: EventStatus::ALL.choose(rng).copied().unwrap_or(EventStatus::Open),
            source,
            timestamp: now - ChronoDuration::milliseconds(rng.gen_range(0..week_ms)),
            affected_assets: rng.gen_range(1..=10),
            assigned_to: if rng.gen_bool(0.7) { ANALYSTS.choose(rng).copied() } else { None },
            risk_score: rng.gen_range(1..=100),
        })
        .collect()
}
