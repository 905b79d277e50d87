//! Stacked severity counts for the SOC threat timeline.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use securewatch_common::{Result, SecureWatchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Hour,
        TimeRange::SixHours,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    /// (points, minutes between points)
    pub fn resolution(&self) -> (usize, i64) {
        match self {
            TimeRange::Hour     => (12, 5),
            TimeRange::SixHours => (24, 15),
            TimeRange::Day      => (48, 30),
            // 30d shares the weekly resolution
            TimeRange::Week | TimeRange::Month => (168, 60),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour     => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::Day      => "24h",
            TimeRange::Week     => "7d",
            TimeRange::Month    => "30d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Hour     => "Last 1 hour",
            TimeRange::SixHours => "Last 6 hours",
            TimeRange::Day      => "Last 24 hours",
            TimeRange::Week     => "Last 7 days",
            TimeRange::Month    => "Last 30 days",
        }
    }

    fn shows_date(&self) -> bool {
        matches!(self, TimeRange::Week | TimeRange::Month)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = SecureWatchError;

    fn from_str(s: &str) -> Result<Self> {
        TimeRange::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SecureWatchError::InvalidFilter(format!("unknown time range '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub total: u32,
}

impl TimelinePoint {
    fn retotal(&mut self) {
        self.total = self.critical + self.high + self.medium + self.low;
    }
}

/// Oldest point first, the last point stamped `now`.
pub fn generate_timeline<R: Rng>(range: TimeRange, now: DateTime<Utc>, rng: &mut R) -> Vec<TimelinePoint> {
    let (points, step_minutes) = range.resolution();

    (0..points)
        .map(|i| {
            let back = (points - i - 1) as i64 * step_minutes;
            let timestamp = now - ChronoDuration::minutes(back);
            let time = if range.shows_date() {
                timestamp.format("%b %d %H:%M").to_string()
            } else {
                timestamp.format("%H:%M").to_string()
            };
            let mut point = TimelinePoint {
                time,
                timestamp,
                critical: rng.gen_range(2..=16),
                high: rng.gen_range(5..=29),
                medium: rng.gen_range(10..=49),
                low: rng.gen_range(15..=74),
                total: 0,
            };
            point.retotal();
            point
        })
        .collect()
}

/// Live nudge of the newest point, as the timeline does every 5 seconds.
pub fn jitter_last_point<R: Rng>(series: &mut [TimelinePoint], rng: &mut R) {
    let Some(last) = series.last_mut() else {
        return;
    };
    last.critical = nudge(last.critical, 2, rng);
    last.high = nudge(last.high, 3, rng);
    last.medium = nudge(last.medium, 4, rng);
    last.low = nudge(last.low, 5, rng);
    last.retotal();
}

fn nudge<R: Rng>(value: u32, spread: i64, rng: &mut R) -> u32 {
    (value as i64 + rng.gen_range(-spread..=spread)).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_point_counts_per_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let counts: Vec<usize> = TimeRange::ALL
            .iter()
            .map(|r| generate_timeline(*r, now, &mut rng).len())
            .collect();
        assert_eq!(counts, vec![12, 24, 48, 168, 168]);
    }

    #[test]
    fn test_series_spacing_and_totals() {
        let mut rng = StdRng::seed_from_u64(2);
        let now = Utc::now();
        let series = generate_timeline(TimeRange::SixHours, now, &mut rng);

        assert_eq!(series.last().unwrap().timestamp, now);
        assert!(series.windows(2).all(|w| w[1].timestamp - w[0].timestamp == ChronoDuration::minutes(15)));
        for p in &series {
            assert_eq!(p.total, p.critical + p.high + p.medium + p.low);
            assert!((2..=16).contains(&p.critical));
            assert!((15..=74).contains(&p.low));
        }
    }

    #[test]
    fn test_jitter_only_touches_last_point() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut series = generate_timeline(TimeRange::Hour, Utc::now(), &mut rng);
        let before = series.clone();
        jitter_last_point(&mut series, &mut rng);

        assert_eq!(series[..11], before[..11]);
        let (old, new) = (&before[11], &series[11]);
        assert!((old.critical as i64 - new.critical as i64).abs() <= 2);
        assert!((old.low as i64 - new.low as i64).abs() <= 5);
        assert_eq!(new.total, new.critical + new.high + new.medium + new.low);
    }

    #[test]
    fn test_nudge_clamps_at_zero() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            assert!(nudge(0, 5, &mut rng) <= 5);
        }
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert!("2w".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default(), TimeRange::Day);
    }

    #[test]
    fn test_jitter_empty_series_is_noop() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut empty: Vec<TimelinePoint> = Vec::new();
        jitter_last_point(&mut empty, &mut rng);
        assert!(empty.is_empty());
    }
}
