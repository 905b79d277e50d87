//! When the "NEW" badge comes off.
//!
//! `Global` reproduces the dashboard's coarse behaviour: an insert leaves only
//! the head flagged, and one timer, re-armed on every insert, clears every flag
//! in the buffer when it fires. `PerRecord` gives each alert its own TTL
//! measured from its own insertion, so bursts keep several badges up at once.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::alert::AlertId;
use crate::buffer::AlertBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessPolicy {
    #[default]
    Global,
    PerRecord,
}

#[derive(Debug)]
pub struct FreshnessTracker {
    policy: FreshnessPolicy,
    ttl: Duration,
    global_deadline: Option<Instant>,
    // Insertion order, so deadlines are non-decreasing front to back.
    per_record: VecDeque<(AlertId, Instant)>,
}

impl FreshnessTracker {
    pub fn new(policy: FreshnessPolicy, ttl: Duration) -> Self {
        Self {
            policy,
            ttl,
            global_deadline: None,
            per_record: VecDeque::new(),
        }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// Call right after `buffer.insert(..)` put `id` at the head.
    pub fn on_insert(&mut self, buffer: &mut AlertBuffer, id: AlertId, now: Instant) {
        match self.policy {
            FreshnessPolicy::Global => {
                buffer.mark_only_head_new();
                self.global_deadline = Some(now + self.ttl);
            }
            FreshnessPolicy::PerRecord => {
                self.per_record.push_back((id, now + self.ttl));
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.policy {
            FreshnessPolicy::Global => self.global_deadline,
            FreshnessPolicy::PerRecord => self.per_record.front().map(|(_, at)| *at),
        }
    }

    /// Clear every flag whose time is up. Returns the number cleared.
    pub fn expire(&mut self, buffer: &mut AlertBuffer, now: Instant) -> usize {
        match self.policy {
            FreshnessPolicy::Global => match self.global_deadline {
                Some(deadline) if deadline <= now => {
                    self.global_deadline = None;
                    buffer.clear_new_flags()
                }
                _ => 0,
            },
            FreshnessPolicy::PerRecord => {
                let mut cleared = 0;
                while let Some((id, deadline)) = self.per_record.front().copied() {
                    if deadline > now {
                        break;
                    }
                    self.per_record.pop_front();
                    if buffer.clear_new_flag(id) {
                        cleared += 1;
                    }
                }
                cleared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::numbered;

    fn insert(tracker: &mut FreshnessTracker, buffer: &mut AlertBuffer, seq: u32, now: Instant) {
        let record = numbered(seq);
        let id = record.id;
        buffer.insert(record);
        tracker.on_insert(buffer, id, now);
    }

    #[test]
    fn test_global_only_head_is_new_after_insert() {
        let t0 = Instant::now();
        let mut buffer = AlertBuffer::new(10);
        let mut tracker = FreshnessTracker::new(FreshnessPolicy::Global, Duration::from_secs(5));

        insert(&mut tracker, &mut buffer, 1, t0);
        insert(&mut tracker, &mut buffer, 2, t0 + Duration::from_secs(1));

        assert_eq!(buffer.new_count(), 1);
        assert_eq!(buffer.head().map(|r| r.id.tie_break), Some(2));
    }

    #[test]
    fn test_global_timer_rearms_on_every_insert() {
        let t0 = Instant::now();
        let mut buffer = AlertBuffer::new(10);
        let mut tracker = FreshnessTracker::new(FreshnessPolicy::Global, Duration::from_secs(5));

        insert(&mut tracker, &mut buffer, 1, t0);
        insert(&mut tracker, &mut buffer, 2, t0 + Duration::from_secs(4));

        // First insert's 5s have passed, but the second re-armed the timer
        assert_eq!(tracker.expire(&mut buffer, t0 + Duration::from_secs(6)), 0);
        assert_eq!(buffer.new_count(), 1);

        assert_eq!(tracker.expire(&mut buffer, t0 + Duration::from_secs(9)), 1);
        assert_eq!(buffer.new_count(), 0);
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_per_record_each_flag_has_own_ttl() {
        let t0 = Instant::now();
        let mut buffer = AlertBuffer::new(10);
        let mut tracker = FreshnessTracker::new(FreshnessPolicy::PerRecord, Duration::from_secs(5));

        insert(&mut tracker, &mut buffer, 1, t0);
        insert(&mut tracker, &mut buffer, 2, t0 + Duration::from_secs(3));
        assert_eq!(buffer.new_count(), 2);
        assert_eq!(tracker.next_deadline(), Some(t0 + Duration::from_secs(5)));

        assert_eq!(tracker.expire(&mut buffer, t0 + Duration::from_secs(5)), 1);
        assert!(buffer.head().unwrap().is_new);
        assert_eq!(tracker.next_deadline(), Some(t0 + Duration::from_secs(8)));

        assert_eq!(tracker.expire(&mut buffer, t0 + Duration::from_secs(8)), 1);
        assert_eq!(buffer.new_count(), 0);
    }

    #[test]
    fn test_per_record_skips_evicted_alerts() {
        let t0 = Instant::now();
        let mut buffer = AlertBuffer::new(1);
        let mut tracker = FreshnessTracker::new(FreshnessPolicy::PerRecord, Duration::from_secs(5));

        insert(&mut tracker, &mut buffer, 1, t0);
        insert(&mut tracker, &mut buffer, 2, t0);

        assert_eq!(tracker.expire(&mut buffer, t0 + Duration::from_secs(5)), 1);
        assert_eq!(tracker.next_deadline(), None);
    }
}
