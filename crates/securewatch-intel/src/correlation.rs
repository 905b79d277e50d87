//! Source × threat correlation matrix on the threat-intelligence page.

use securewatch_common::Source;
use serde::Serialize;

pub const THREAT_TYPES: [&str; 6] = ["Malware", "Phishing", "Ransomware", "APT", "DDoS", "Insider"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub source: Source,
    pub threat: &'static str,
    pub value: f64,
    pub events: u32,
}

const fn cell(source: Source, threat: &'static str, value: f64, events: u32) -> CorrelationCell {
    CorrelationCell { source, threat, value, events }
}

pub const CORRELATIONS: [CorrelationCell; 24] = [
    cell(Source::Elastic,  "Malware",    0.89, 2847),
    cell(Source::Elastic,  "Phishing",   0.76, 1923),
    cell(Source::Elastic,  "Ransomware", 0.45, 567),
    cell(Source::Elastic,  "APT",        0.67, 234),
    cell(Source::Elastic,  "DDoS",       0.23, 89),
    cell(Source::Elastic,  "Insider",    0.34, 156),
    cell(Source::Trellix,  "Malware",    0.92, 3124),
    cell(Source::Trellix,  "Phishing",   0.68, 1456),
    cell(Source::Trellix,  "Ransomware", 0.78, 789),
    cell(Source::Trellix,  "APT",        0.56, 345),
    cell(Source::Trellix,  "DDoS",       0.12, 45),
    cell(Source::Trellix,  "Insider",    0.29, 123),
    cell(Source::Defender, "Malware",    0.85, 2567),
    cell(Source::Defender, "Phishing",   0.91, 2890),
    cell(Source::Defender, "Ransomware", 0.67, 678),
    cell(Source::Defender, "APT",        0.43, 189),
    cell(Source::Defender, "DDoS",       0.18, 67),
    cell(Source::Defender, "Insider",    0.52, 234),
    cell(Source::Tenable,  "Malware",    0.34, 456),
    cell(Source::Tenable,  "Phishing",   0.28, 234),
    cell(Source::Tenable,  "Ransomware", 0.56, 567),
    cell(Source::Tenable,  "APT",        0.78, 890),
    cell(Source::Tenable,  "DDoS",       0.45, 345),
    cell(Source::Tenable,  "Insider",    0.67, 456),
];

/// Linear scan; an unknown pair reads as zero correlation and zero events.
pub fn lookup(source: Source, threat: &str) -> (f64, u32) {
    CORRELATIONS
        .iter()
        .find(|c| c.source == source && c.threat.eq_ignore_ascii_case(threat))
        .map_or((0.0, 0), |c| (c.value, c.events))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatBand {
    Critical,
    High,
    Elevated,
    Low,
    Minimal,
}

impl HeatBand {
    pub fn for_value(value: f64) -> Self {
        if value >= 0.8 {
            HeatBand::Critical
        } else if value >= 0.6 {
            HeatBand::High
        } else if value >= 0.4 {
            HeatBand::Elevated
        } else if value >= 0.2 {
            HeatBand::Low
        } else {
            HeatBand::Minimal
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            HeatBand::Critical => "heat-critical",
            HeatBand::High     => "heat-high",
            HeatBand::Elevated => "heat-elevated",
            HeatBand::Low      => "heat-low",
            HeatBand::Minimal  => "heat-minimal",
        }
    }
}

/// Row-major grid (sources × threats) for rendering.
pub fn grid() -> Vec<(Source, Vec<CorrelationCell>)> {
    Source::ALL
        .iter()
        .map(|source| {
            let row = THREAT_TYPES
                .iter()
                .map(|threat| {
                    let (value, events) = lookup(*source, threat);
                    cell(*source, *threat, value, events)
                })
                .collect();
            (*source, row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_table() {
        assert_eq!(lookup(Source::Trellix, "Malware"), (0.92, 3124));
        assert_eq!(lookup(Source::Defender, "Phishing"), (0.91, 2890));
        assert_eq!(lookup(Source::Tenable, "apt"), (0.78, 890));
    }

    #[test]
    fn test_unknown_threat_reads_zero() {
        assert_eq!(lookup(Source::Elastic, "Cryptojacking"), (0.0, 0));
    }

    #[test]
    fn test_heat_bands() {
        assert_eq!(HeatBand::for_value(0.92), HeatBand::Critical);
        assert_eq!(HeatBand::for_value(0.8), HeatBand::Critical);
        assert_eq!(HeatBand::for_value(0.67), HeatBand::High);
        assert_eq!(HeatBand::for_value(0.45), HeatBand::Elevated);
        assert_eq!(HeatBand::for_value(0.23), HeatBand::Low);
        assert_eq!(HeatBand::for_value(0.12), HeatBand::Minimal);
    }

    #[test]
    fn test_grid_covers_every_pair() {
        let grid = grid();
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|(_, row)| row.len() == THREAT_TYPES.len()));
        assert!(grid.iter().flat_map(|(_, row)| row).all(|c| c.events > 0));
    }
}
