//! Alert record shown in the live feed.

use chrono::{DateTime, Utc};
use securewatch_common::{Severity, Source};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert categories the generator draws from.
pub const ALERT_TYPES: [&str; 10] = [
    "Malware Detection",
    "Suspicious Network Activity",
    "Failed Authentication",
    "Privilege Escalation",
    "Data Exfiltration",
    "Brute Force Attack",
    "SQL Injection Attempt",
    "Phishing Email Detected",
    "Unauthorized Access",
    "System Vulnerability",
];

/// Hosts the generator attributes alerts to.
pub const HOSTNAMES: [&str; 6] = [
    "web-server-01.corp.local",
    "db-primary.internal",
    "mail-gateway.company.com",
    "workstation-045.domain.local",
    "firewall-edge.network",
    "dc-controller.ad.local",
];

/// Generation time in milliseconds plus a random tie-break, so two alerts
/// generated in the same millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId {
    pub millis: i64,
    pub tie_break: u32,
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:08x}", self.millis, self.tie_break)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    pub severity: Severity,
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: String,
    pub hostname: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Drives the "NEW" badge; see `freshness` for when it clears.
    #[serde(default)]
    pub is_new: bool,
}

impl AlertRecord {
    pub fn describe(host: &str) -> String {
        format!("Detected suspicious activity on {host}. Immediate investigation required.")
    }
}
