//! Live feed sessions.
//!
//! Opening the feed stream creates a session: a `LiveFeed`, its scheduler
//! task and an update channel. Removing the session from the registry drops
//! its `FeedHandle`, which stops the scheduler.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use securewatch_common::{Result, SecureWatchError};
use securewatch_feed::{AlertGenerator, FeedConfig, FeedFilter, FeedHandle, FeedScheduler, FeedUpdate, LiveFeed};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{AppEvent, SharedState};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

pub struct FeedSession {
    pub feed: Arc<RwLock<LiveFeed>>,
    pub updates: broadcast::Sender<FeedUpdate>,
    handle: FeedHandle,
}

impl FeedSession {
    fn open(config: &FeedConfig, filter: FeedFilter) -> (Self, broadcast::Receiver<FeedUpdate>) {
        let mut generator = AlertGenerator::new(StdRng::from_entropy());
        let backlog = generator.generate_backlog(config.seed_backlog, config.seed_window(), Utc::now());
        let feed = Arc::new(RwLock::new(LiveFeed::with_backlog(config, filter, backlog)));

        let (updates, rx) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let handle = FeedScheduler::new(generator, config).start(feed.clone(), updates.clone());

        (Self { feed, updates, handle }, rx)
    }

    /// Tell every stream on this session to re-render.
    pub fn notify(&self, update: FeedUpdate) {
        let _ = self.updates.send(update);
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, FeedSession>>,
}

impl SessionRegistry {
    /// Start a feed and return its id with a subscription taken before the
    /// scheduler can publish anything.
    pub async fn open(
        &self,
        config: &FeedConfig,
        filter: FeedFilter,
    ) -> (Uuid, Arc<RwLock<LiveFeed>>, broadcast::Receiver<FeedUpdate>) {
        let id = Uuid::new_v4();
        let (session, rx) = FeedSession::open(config, filter);
        let feed = session.feed.clone();

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);
        info!(session = %id, open = sessions.len(), "Feed session opened");
        (id, feed, rx)
    }

    pub async fn feed(&self, id: Uuid) -> Result<Arc<RwLock<LiveFeed>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.feed.clone())
            .ok_or_else(|| SecureWatchError::SessionNotFound(id.to_string()))
    }

    pub async fn notify(&self, id: Uuid, update: FeedUpdate) -> Result<()> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.notify(update))
            .ok_or_else(|| SecureWatchError::SessionNotFound(id.to_string()))
    }

    /// Remove a session and wait for its scheduler to stop.
    pub async fn close(&self, id: Uuid) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| SecureWatchError::SessionNotFound(id.to_string()))?;
        session.handle.shutdown().await;
        info!(session = %id, "Feed session closed");
        Ok(())
    }

    pub async fn close_all(&self) -> usize {
        let drained: Vec<FeedSession> = self.sessions.write().await.drain().map(|(_, s)| s).collect();
        let count = drained.len();
        for session in drained {
            session.handle.shutdown().await;
        }
        count
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&id)
    }
}

/// Held by a feed stream; dropping it tears the session down.
pub struct SessionGuard {
    id: Uuid,
    state: SharedState,
}

impl SessionGuard {
    pub fn new(id: Uuid, state: SharedState) -> Self {
        Self { id, state }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let id = self.id;
        let state = self.state.clone();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            if state.sessions.close(id).await.is_ok() {
                state.publish(AppEvent::FeedClosed { session: id });
            } else {
                debug!(session = %id, "Feed session already closed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quick_config() -> FeedConfig {
        FeedConfig {
            min_interval_ms: 100,
            max_interval_ms: 100,
            seed_backlog: 3,
            ..FeedConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_seeds_backlog() {
        let registry = SessionRegistry::default();
        let (id, feed, _rx) = registry.open(&quick_config(), FeedFilter::default()).await;
        assert!(registry.contains(id).await);
        assert_eq!(feed.read().await.buffer().len(), 3);
        assert_eq!(feed.read().await.buffer().new_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_insertions() {
        let registry = SessionRegistry::default();
        let (id, feed, mut rx) = registry.open(&quick_config(), FeedFilter::default()).await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.recv().await.is_ok());
        let before = feed.read().await.buffer().inserted_total();

        registry.close(id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(feed.read().await.buffer().inserted_total(), before);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let registry = SessionRegistry::default();
        let err = registry.close(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SecureWatchError::SessionNotFound(_)));
        assert!(registry.feed(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_all() {
        let registry = SessionRegistry::default();
        registry.open(&quick_config(), FeedFilter::default()).await;
        registry.open(&quick_config(), FeedFilter::default()).await;
        assert_eq!(registry.close_all().await, 2);
        assert_eq!(registry.len().await, 0);
    }
}
