//! Severity and source filtering for the live feed.

use securewatch_common::{Result, SecureWatchError, Severity, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::alert::AlertRecord;
use crate::buffer::AlertBuffer;

// ── Severity filter ───────────────────────────────────────────────────────────

/// Either every severity or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(wanted) => *wanted == severity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityFilter::All => "all",
            SeverityFilter::Only(s) => s.as_str(),
        }
    }
}

impl fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityFilter {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(SeverityFilter::All);
        }
        trimmed.parse::<Severity>().map(SeverityFilter::Only)
    }
}

impl TryFrom<String> for SeverityFilter {
    type Error = SecureWatchError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SeverityFilter> for String {
    fn from(filter: SeverityFilter) -> Self {
        filter.as_str().to_string()
    }
}

// ── Source toggles ────────────────────────────────────────────────────────────

/// Source name → enabled. A source absent from the map counts as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToggles(BTreeMap<Source, bool>);

impl Default for SourceToggles {
    fn default() -> Self {
        Self::all()
    }
}

impl SourceToggles {
    pub fn all() -> Self {
        Self(Source::ALL.iter().map(|s| (*s, true)).collect())
    }

    pub fn none() -> Self {
        Self(Source::ALL.iter().map(|s| (*s, false)).collect())
    }

    pub fn from_map(map: BTreeMap<Source, bool>) -> Self {
        Self(map)
    }

    pub fn is_enabled(&self, source: Source) -> bool {
        self.0.get(&source).copied().unwrap_or(false)
    }

    pub fn set(&mut self, source: Source, enabled: bool) {
        self.0.insert(source, enabled);
    }

    /// Flip one source, as the source buttons on the SOC controls bar do.
    pub fn toggle(&mut self, source: Source) -> bool {
        let enabled = !self.is_enabled(source);
        self.set(source, enabled);
        enabled
    }

    pub fn enabled(&self) -> Vec<Source> {
        Source::ALL.iter().copied().filter(|s| self.is_enabled(*s)).collect()
    }

    /// Comma list form used in query strings, e.g. `elastic,tenable`.
    pub fn to_query(&self) -> String {
        let enabled = self.enabled();
        if enabled.is_empty() {
            return "none".to_string();
        }
        enabled.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",")
    }
}

impl FromStr for SourceToggles {
    type Err = SecureWatchError;

    /// Accepts `all`, `none`, or a comma list of source names.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        let mut toggles = Self::none();
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(toggles);
        }
        for name in trimmed.split(',').filter(|p| !p.trim().is_empty()) {
            toggles.set(name.parse()?, true);
        }
        Ok(toggles)
    }
}

// ── Feed filter ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    #[serde(default)]
    pub severity: SeverityFilter,
    #[serde(default)]
    pub sources: SourceToggles,
}

impl FeedFilter {
    pub fn new(severity: SeverityFilter, sources: SourceToggles) -> Self {
        Self { severity, sources }
    }

    pub fn matches(&self, record: &AlertRecord) -> bool {
        self.severity.matches(record.severity) && self.sources.is_enabled(record.source)
    }

    /// Visible subset, in buffer order.
    pub fn apply<'a>(&self, buffer: &'a AlertBuffer) -> Vec<&'a AlertRecord> {
        buffer.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::numbered;
    use pretty_assertions::assert_eq;

    fn filled(n: u32) -> AlertBuffer {
        let mut buffer = AlertBuffer::new(50);
        for seq in 1..=n {
            buffer.insert(numbered(seq));
        }
        buffer
    }

    #[test]
    fn test_all_severities_all_sources_is_identity() {
        let buffer = filled(30);
        let visible = FeedFilter::default().apply(&buffer);
        let everything: Vec<&AlertRecord> = buffer.iter().collect();
        assert_eq!(visible, everything);
    }

    #[test]
    fn test_critical_with_every_source_disabled_is_empty() {
        let buffer = filled(30);
        let filter = FeedFilter::new(SeverityFilter::Only(Severity::Critical), SourceToggles::none());
        assert!(filter.apply(&buffer).is_empty());
    }

    #[test]
    fn test_disabled_sources_hide_everything_for_any_severity() {
        let buffer = filled(30);
        let mut choices = vec![SeverityFilter::All];
        choices.extend(Severity::ALL.iter().map(|s| SeverityFilter::Only(*s)));
        for severity in choices {
            let filter = FeedFilter::new(severity, SourceToggles::none());
            assert!(filter.apply(&buffer).is_empty(), "{severity} leaked records");
        }
    }

    #[test]
    fn test_filter_preserves_buffer_order() {
        let buffer = filled(20);
        let filter = FeedFilter::new(SeverityFilter::All, "elastic,defender".parse().unwrap());
        let visible = filter.apply(&buffer);
        assert!(!visible.is_empty());
        assert!(visible.iter().all(|r| matches!(r.source, Source::Elastic | Source::Defender)));
        let seqs: Vec<u32> = visible.iter().map(|r| r.id.tie_break).collect();
        assert!(seqs.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_single_severity() {
        let buffer = filled(20);
        let filter = FeedFilter::new("high".parse().unwrap(), SourceToggles::all());
        let visible = filter.apply(&buffer);
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|r| r.severity == Severity::High));
    }

    #[test]
    fn test_missing_source_counts_as_disabled() {
        let mut map = BTreeMap::new();
        map.insert(Source::Elastic, true);
        let toggles = SourceToggles::from_map(map);
        assert!(toggles.is_enabled(Source::Elastic));
        assert!(!toggles.is_enabled(Source::Tenable));
    }

    #[test]
    fn test_severity_filter_serializes_as_plain_string() {
        let json = serde_json::to_string(&SeverityFilter::All).unwrap();
        assert_eq!(json, "\"all\"");
        let parsed: SeverityFilter = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, SeverityFilter::Only(Severity::Medium));
    }

    #[test]
    fn test_toggle_and_query_form() {
        let mut toggles = SourceToggles::all();
        assert!(!toggles.toggle(Source::Trellix));
        assert_eq!(toggles.to_query(), "elastic,defender,tenable");
        assert_eq!(SourceToggles::none().to_query(), "none");
        assert_eq!("none".parse::<SourceToggles>().unwrap(), SourceToggles::none());
        assert!("elastic,splunk".parse::<SourceToggles>().is_err());
    }
}
