//! Bounded, newest-first alert buffer.
//!
//! Inserts land at the head; once the buffer is over capacity the oldest
//! entries fall off the tail. Order is insertion order, never wall-clock: a
//! record inserted later is always nearer the head.

use std::collections::VecDeque;

use crate::alert::{AlertId, AlertRecord};

#[derive(Debug, Clone)]
pub struct AlertBuffer {
    records: VecDeque<AlertRecord>,
    capacity: usize,
    inserted_total: u64,
}

impl AlertBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
            inserted_total: 0,
        }
    }

    /// Prepend `record`, returning whatever was evicted from the tail.
    pub fn insert(&mut self, record: AlertRecord) -> Vec<AlertRecord> {
        self.records.push_front(record);
        self.inserted_total += 1;

        let mut evicted = Vec::new();
        while self.records.len() > self.capacity {
            if let Some(oldest) = self.records.pop_back() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lifetime insert count, including records since evicted.
    pub fn inserted_total(&self) -> u64 {
        self.inserted_total
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.records.iter()
    }

    pub fn head(&self) -> Option<&AlertRecord> {
        self.records.front()
    }

    pub fn get(&self, id: AlertId) -> Option<&AlertRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn new_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_new).count()
    }

    // ── Freshness flag mutators ──────────────────────────────────────────────

    pub(crate) fn mark_only_head_new(&mut self) {
        for (i, record) in self.records.iter_mut().enumerate() {
            record.is_new = i == 0;
        }
    }

    /// Returns how many flags were actually cleared.
    pub(crate) fn clear_new_flags(&mut self) -> usize {
        let mut cleared = 0;
        for record in self.records.iter_mut().filter(|r| r.is_new) {
            record.is_new = false;
            cleared += 1;
        }
        cleared
    }

    pub(crate) fn clear_new_flag(&mut self, id: AlertId) -> bool {
        match self.records.iter_mut().find(|r| r.id == id && r.is_new) {
            Some(record) => {
                record.is_new = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use securewatch_common::{Severity, Source};

    /// Record #`seq`; later sequence numbers carry later timestamps.
    pub(crate) fn numbered(seq: u32) -> AlertRecord {
        let base = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let timestamp = base + Duration::seconds(seq as i64);
        AlertRecord {
            id: AlertId { millis: timestamp.timestamp_millis(), tie_break: seq },
            severity: Severity::ALL[seq as usize % 4],
            source: Source::ALL[seq as usize % 4],
            kind: "Malware Detection".to_string(),
            hostname: "web-server-01.corp.local".to_string(),
            timestamp,
            description: AlertRecord::describe("db-primary.internal"),
            is_new: true,
        }
    }

    fn seqs(buffer: &AlertBuffer) -> Vec<u32> {
        buffer.iter().map(|r| r.id.tie_break).collect()
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut buffer = AlertBuffer::new(50);
        for seq in 1..=200 {
            buffer.insert(numbered(seq));
            assert!(buffer.len() <= 50, "len {} after insert #{}", buffer.len(), seq);
        }
        assert_eq!(buffer.inserted_total(), 200);
    }

    #[test]
    fn test_fifty_one_inserts_keep_the_latest_fifty() {
        let mut buffer = AlertBuffer::new(50);
        let mut evicted = Vec::new();
        for seq in 1..=51 {
            evicted.extend(buffer.insert(numbered(seq)));
        }

        assert_eq!(buffer.len(), 50);
        assert_eq!(buffer.head().map(|r| r.id.tie_break), Some(51));
        assert_eq!(buffer.iter().last().map(|r| r.id.tie_break), Some(2));
        assert_eq!(seqs(&buffer), (2..=51).rev().collect::<Vec<_>>());
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id.tie_break, 1);
    }

    #[test]
    fn test_insertion_order_wins_over_timestamps() {
        let mut buffer = AlertBuffer::new(10);
        // #5 carries the newest timestamp but is inserted first
        buffer.insert(numbered(5));
        buffer.insert(numbered(1));
        buffer.insert(numbered(3));
        assert_eq!(seqs(&buffer), vec![3, 1, 5]);
    }

    #[test]
    fn test_mark_only_head_new() {
        let mut buffer = AlertBuffer::new(10);
        for seq in 1..=4 {
            buffer.insert(numbered(seq));
        }
        buffer.mark_only_head_new();
        assert_eq!(buffer.new_count(), 1);
        assert!(buffer.head().unwrap().is_new);
    }

    #[test]
    fn test_clear_flags_reports_count() {
        let mut buffer = AlertBuffer::new(10);
        for seq in 1..=3 {
            buffer.insert(numbered(seq));
        }
        assert_eq!(buffer.clear_new_flags(), 3);
        assert_eq!(buffer.clear_new_flags(), 0);
    }

    #[test]
    fn test_clear_single_flag_ignores_evicted_ids() {
        let mut buffer = AlertBuffer::new(1);
        let first = numbered(1);
        let first_id = first.id;
        buffer.insert(first);
        buffer.insert(numbered(2));
        assert!(!buffer.clear_new_flag(first_id));
        assert!(buffer.get(first_id).is_none());
    }
}
