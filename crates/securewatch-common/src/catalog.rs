//! Closed enumerations shared by every dashboard page: alert severity and
//! the upstream security platforms the dashboard reports on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SecureWatchError;

// ── Severity ──────────────────────────────────────────────────────────────────

/// Alert severity. Declared lowest-first so the derived `Ord` gives
/// `Critical > High > Medium > Low`. The order only drives display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Every severity, most severe first (the order the UI lists them in).
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High     => "high",
            Severity::Medium   => "medium",
            Severity::Low      => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High     => "High",
            Severity::Medium   => "Medium",
            Severity::Low      => "Low",
        }
    }

    /// CSS badge class used by every page that colour-codes severity.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Severity::Critical => "badge-danger",
            Severity::High     => "badge-warning",
            Severity::Medium   => "badge-caution",
            Severity::Low      => "badge-success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high"     => Ok(Severity::High),
            "medium"   => Ok(Severity::Medium),
            "low"      => Ok(Severity::Low),
            other      => Err(SecureWatchError::InvalidFilter(format!("unknown severity '{other}'"))),
        }
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Upstream security platform an alert or event claims to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Elastic,
    Trellix,
    Defender,
    Tenable,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Elastic,
        Source::Trellix,
        Source::Defender,
        Source::Tenable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Elastic  => "elastic",
            Source::Trellix  => "trellix",
            Source::Defender => "defender",
            Source::Tenable  => "tenable",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::Elastic  => "Elastic",
            Source::Trellix  => "Trellix",
            Source::Defender => "Defender",
            Source::Tenable  => "Tenable",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elastic"  => Ok(Source::Elastic),
            "trellix"  => Ok(Source::Trellix),
            "defender" => Ok(Source::Defender),
            "tenable"  => Ok(Source::Tenable),
            other      => Err(SecureWatchError::InvalidFilter(format!("unknown source '{other}'"))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(" low ".parse::<Severity>().unwrap(), Severity::Low);
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_source_serde_names() {
        let json = serde_json::to_string(&Source::Defender).unwrap();
        assert_eq!(json, "\"defender\"");
        let parsed: Source = serde_json::from_str("\"tenable\"").unwrap();
        assert_eq!(parsed, Source::Tenable);
    }

    #[test]
    fn test_unknown_source_is_filter_error() {
        let err = "splunk".parse::<Source>().unwrap_err();
        assert!(matches!(err, SecureWatchError::InvalidFilter(_)));
    }
}
