//! Synthetic alert generation.
//!
//! Every field is an independent uniform draw from a fixed list. The RNG is a
//! type parameter so tests can hand in a seeded `StdRng` and get the same
//! alerts back on every run.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use securewatch_common::{Severity, Source};
use std::time::Duration;

use crate::alert::{AlertId, AlertRecord, ALERT_TYPES, HOSTNAMES};

pub struct AlertGenerator<R> {
    rng: R,
}

impl<R: Rng> AlertGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn generate(&mut self) -> AlertRecord {
        self.generate_at(Utc::now())
    }

    /// Build one alert stamped `now`. Fresh alerts start with `is_new` set.
    pub fn generate_at(&mut self, now: DateTime<Utc>) -> AlertRecord {
        let severity = *pick(&mut self.rng, &Severity::ALL);
        let source = *pick(&mut self.rng, &Source::ALL);
        let kind = *pick(&mut self.rng, &ALERT_TYPES);
        let hostname = *pick(&mut self.rng, &HOSTNAMES);
        // The description names a host drawn separately from `hostname`.
        let described_host = *pick(&mut self.rng, &HOSTNAMES);

        AlertRecord {
            id: AlertId {
                millis: now.timestamp_millis(),
                tie_break: self.rng.gen(),
            },
            severity,
            source,
            kind: kind.to_string(),
            hostname: hostname.to_string(),
            timestamp: now,
            description: AlertRecord::describe(described_host),
            is_new: true,
        }
    }

    /// Back-dated alerts for a feed that is just opening: timestamps fall at
    /// random inside `window` before `now`, sorted newest first, none flagged new.
    pub fn generate_backlog(
        &mut self,
        count: usize,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Vec<AlertRecord> {
        let window_ms = window.as_millis().min(i64::MAX as u128) as i64;
        let mut backlog: Vec<AlertRecord> = (0..count)
            .map(|_| {
                let age_ms = if window_ms > 0 { self.rng.gen_range(0..window_ms) } else { 0 };
                let mut alert = self.generate_at(now - ChronoDuration::milliseconds(age_ms));
                alert.is_new = false;
                alert
            })
            .collect();
        backlog.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        backlog
    }

    /// Uniform draw from `[min, max]`, used for the gap before the next alert.
    pub fn draw_interval(&mut self, min: Duration, max: Duration) -> Duration {
        if min >= max {
            return min;
        }
        let ms = self.rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(ms)
    }
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    // Every list passed in here is a non-empty const array.
    items.choose(rng).unwrap_or(&items[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(seed: u64) -> AlertGenerator<StdRng> {
        AlertGenerator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_same_seed_same_alerts() {
        let now = Utc::now();
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..20 {
            assert_eq!(a.generate_at(now), b.generate_at(now));
        }
    }

    #[test]
    fn test_fields_drawn_from_closed_sets() {
        let mut generator = seeded(7);
        for _ in 0..200 {
            let alert = generator.generate();
            assert!(ALERT_TYPES.contains(&alert.kind.as_str()));
            assert!(HOSTNAMES.contains(&alert.hostname.as_str()));
            assert!(alert.description.starts_with("Detected suspicious activity on "));
            assert!(alert.is_new);
        }
    }

    #[test]
    fn test_every_severity_and_source_eventually_drawn() {
        let mut generator = seeded(3);
        let alerts: Vec<_> = (0..400).map(|_| generator.generate()).collect();
        for severity in Severity::ALL {
            assert!(alerts.iter().any(|a| a.severity == severity), "never drew {severity}");
        }
        for source in Source::ALL {
            assert!(alerts.iter().any(|a| a.source == source), "never drew {source}");
        }
    }

    #[test]
    fn test_backlog_sorted_newest_first_within_window() {
        let now = Utc::now();
        let window = Duration::from_secs(3600);
        let backlog = seeded(11).generate_backlog(15, window, now);

        assert_eq!(backlog.len(), 15);
        assert!(backlog.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert!(backlog.iter().all(|a| !a.is_new));
        assert!(backlog.iter().all(|a| a.timestamp <= now && now - a.timestamp <= ChronoDuration::hours(1)));
    }

    #[test]
    fn test_interval_within_bounds() {
        let mut generator = seeded(99);
        let (min, max) = (Duration::from_secs(5), Duration::from_secs(15));
        for _ in 0..500 {
            let d = generator.draw_interval(min, max);
            assert!(d >= min && d <= max, "{d:?} out of bounds");
        }
    }

    #[test]
    fn test_degenerate_interval_returns_min() {
        let mut generator = seeded(1);
        let d = Duration::from_secs(8);
        assert_eq!(generator.draw_interval(d, d), d);
    }
}
