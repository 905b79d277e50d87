//! One feed's complete state: buffer, filter, freshness and view, owned in a
//! single place so the scheduler task and request handlers agree on it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::alert::{AlertId, AlertRecord};
use crate::buffer::AlertBuffer;
use crate::config::FeedConfig;
use crate::filter::FeedFilter;
use crate::freshness::{FreshnessPolicy, FreshnessTracker};
use crate::view::FeedView;

#[derive(Debug)]
pub struct LiveFeed {
    buffer: AlertBuffer,
    filter: FeedFilter,
    freshness: FreshnessTracker,
    view: FeedView,
    opened_at: DateTime<Utc>,
}

/// What a renderer needs to draw the panel once.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub alerts: Vec<AlertRecord>,
    pub visible_count: usize,
    pub buffered_count: usize,
    pub inserted_total: u64,
    pub filter: FeedFilter,
    pub view: FeedView,
    pub freshness: FreshnessPolicy,
    pub opened_at: DateTime<Utc>,
}

impl LiveFeed {
    pub fn new(config: &FeedConfig, filter: FeedFilter) -> Self {
        Self {
            buffer: AlertBuffer::new(config.capacity),
            filter,
            freshness: FreshnessTracker::new(config.freshness, config.fresh_ttl()),
            view: FeedView::default(),
            opened_at: Utc::now(),
        }
    }

    /// Open with a newest-first backlog already in place.
    pub fn with_backlog(config: &FeedConfig, filter: FeedFilter, backlog: Vec<AlertRecord>) -> Self {
        let mut feed = Self::new(config, filter);
        for record in backlog.into_iter().rev() {
            feed.buffer.insert(record);
        }
        feed
    }

    /// Insert a freshly generated alert. Returns whether the panel should
    /// jump back to the top.
    pub fn push(&mut self, record: AlertRecord, now: Instant) -> bool {
        let id: AlertId = record.id;
        self.buffer.insert(record);
        self.freshness.on_insert(&mut self.buffer, id, now);
        self.view.on_buffer_mutation()
    }

    /// Clear due "NEW" badges. `Some(reset_scroll)` when anything changed.
    pub fn expire_fresh(&mut self, now: Instant) -> Option<bool> {
        match self.freshness.expire(&mut self.buffer, now) {
            0 => None,
            _ => Some(self.view.on_buffer_mutation()),
        }
    }

    pub fn next_fresh_deadline(&self) -> Option<Instant> {
        self.freshness.next_deadline()
    }

    pub fn buffer(&self) -> &AlertBuffer {
        &self.buffer
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FeedFilter) {
        self.filter = filter;
    }

    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut FeedView {
        &mut self.view
    }

    pub fn visible(&self) -> Vec<&AlertRecord> {
        self.filter.apply(&self.buffer)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let alerts: Vec<AlertRecord> = self.visible().into_iter().cloned().collect();
        FeedSnapshot {
            visible_count: alerts.len(),
            alerts,
            buffered_count: self.buffer.len(),
            inserted_total: self.buffer.inserted_total(),
            filter: self.filter.clone(),
            view: self.view,
            freshness: self.freshness.policy(),
            opened_at: self.opened_at,
        }
    }
}
