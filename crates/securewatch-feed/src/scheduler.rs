//! Randomized alert arrival.
//!
//! `FeedScheduler::start` spawns one task per feed. The task sleeps a fresh
//! random interval, generates an alert, pushes it into the shared `LiveFeed`
//! and announces the change on a broadcast channel. The same task also fires
//! the freshness timer.
//!
//! The returned `FeedHandle` owns the task: `shutdown()` stops it and waits,
//! and dropping the handle aborts it, so a torn-down feed never inserts again.

use rand::Rng;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::alert::AlertId;
use crate::config::FeedConfig;
use crate::generator::AlertGenerator;
use crate::live::LiveFeed;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateKind {
    /// First frame of a newly opened feed.
    Opened,
    Inserted { id: String },
    FreshnessCleared,
    /// Severity or source selection changed.
    FilterChanged,
    /// Scroll, pause or scroll-to-latest.
    ViewChanged,
}

/// Emitted after every change to a feed, whether the scheduler or a
/// request handler made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedUpdate {
    #[serde(flatten)]
    pub kind: UpdateKind,
    pub reset_scroll: bool,
}

impl FeedUpdate {
    fn inserted(id: AlertId, reset_scroll: bool) -> Self {
        Self { kind: UpdateKind::Inserted { id: id.to_string() }, reset_scroll }
    }

    pub fn opened() -> Self {
        Self { kind: UpdateKind::Opened, reset_scroll: true }
    }

    pub fn filter_changed() -> Self {
        Self { kind: UpdateKind::FilterChanged, reset_scroll: false }
    }

    pub fn view_changed(reset_scroll: bool) -> Self {
        Self { kind: UpdateKind::ViewChanged, reset_scroll }
    }
}

pub struct FeedScheduler<R> {
    generator: AlertGenerator<R>,
    min_interval: Duration,
    max_interval: Duration,
}

impl<R: Rng + Send + 'static> FeedScheduler<R> {
    pub fn new(generator: AlertGenerator<R>, config: &FeedConfig) -> Self {
        Self {
            generator,
            min_interval: Duration::from_millis(config.min_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
        }
    }

    pub fn start(
        mut self,
        feed: Arc<RwLock<LiveFeed>>,
        updates: broadcast::Sender<FeedUpdate>,
    ) -> FeedHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut next_insert = Instant::now() + self.next_gap();

            loop {
                let fresh_deadline = feed.read().await.next_fresh_deadline();

                tokio::select! {
                    _ = sleep_until(next_insert) => {
                        let record = self.generator.generate();
                        let id = record.id;
                        let reset_scroll = feed.write().await.push(record, Instant::now());
                        trace!(alert = %id, "alert inserted");
                        // No subscribers is fine; the feed state is still updated.
                        let _ = updates.send(FeedUpdate::inserted(id, reset_scroll));
                        next_insert = Instant::now() + self.next_gap();
                    }
                    _ = sleep_until_opt(fresh_deadline) => {
                        if let Some(reset_scroll) = feed.write().await.expire_fresh(Instant::now()) {
                            let _ = updates.send(FeedUpdate {
                                kind: UpdateKind::FreshnessCleared,
                                reset_scroll,
                            });
                        }
                    }
                    _ = &mut shutdown_rx => {
                        debug!("feed scheduler shutting down");
                        break;
                    }
                }
            }
        });

        FeedHandle { shutdown_tx: Some(shutdown_tx), task: Some(task) }
    }

    fn next_gap(&mut self) -> Duration {
        self.generator.draw_interval(self.min_interval, self.max_interval)
    }
}

fn sleep_until_opt(deadline: Option<Instant>) -> impl Future<Output = ()> {
    async move {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Owner of a running scheduler task.
#[derive(Debug)]
pub struct FeedHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Signal the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FeedFilter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> FeedConfig {
        FeedConfig { seed_backlog: 0, ..FeedConfig::default() }
    }

    fn spawn(seed: u64) -> (Arc<RwLock<LiveFeed>>, broadcast::Receiver<FeedUpdate>, FeedHandle) {
        let config = quiet_config();
        let feed = Arc::new(RwLock::new(LiveFeed::new(&config, FeedFilter::default())));
        let (tx, rx) = broadcast::channel(64);
        let scheduler = FeedScheduler::new(AlertGenerator::new(StdRng::seed_from_u64(seed)), &config);
        let handle = scheduler.start(feed.clone(), tx);
        (feed, rx, handle)
    }

    async fn inserted(feed: &Arc<RwLock<LiveFeed>>) -> u64 {
        feed.read().await.buffer().inserted_total()
    }

    #[tokio::test(start_paused = true)]
    async fn test_inserts_at_randomized_intervals() {
        let (feed, _rx, handle) = spawn(5);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(inserted(&feed).await, 0, "nothing may arrive before the 5s floor");

        tokio::time::sleep(Duration::from_secs(60)).await;
        let count = inserted(&feed).await;
        // 64.9s of 5-15s gaps
        assert!((4..=12).contains(&count), "unexpected insert count {count}");

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_insertions_after_shutdown() {
        let (feed, _rx, handle) = spawn(8);
        tokio::time::sleep(Duration::from_secs(45)).await;
        let before = inserted(&feed).await;
        assert!(before >= 3);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(inserted(&feed).await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_timer() {
        let (feed, _rx, handle) = spawn(13);
        tokio::time::sleep(Duration::from_secs(30)).await;
        let before = inserted(&feed).await;

        drop(handle);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(inserted(&feed).await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_announce_inserts_and_freshness() {
        let (feed, mut rx, handle) = spawn(21);

        let first = rx.recv().await.unwrap();
        assert!(matches!(first.kind, UpdateKind::Inserted { .. }));
        assert!(first.reset_scroll);
        assert_eq!(feed.read().await.buffer().new_count(), 1);

        // Next insert is at least 5s away; the badge clears at exactly 5s.
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, UpdateKind::FreshnessCleared);
        assert_eq!(feed.read().await.buffer().new_count(), 0);

        handle.shutdown().await;
    }
}
