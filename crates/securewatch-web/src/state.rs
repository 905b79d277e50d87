//! Shared application state for the web server.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use securewatch_intel::executive::ExportFormat;
use securewatch_intel::timeline::{generate_timeline, jitter_last_point};
use securewatch_intel::{
    ConnectionMonitor, ConnectionStatus, EventsTable, HuntingDesk, IntegrationBoard,
    IntegrationStatus, TimeRange, TimelinePoint,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::sessions::SessionRegistry;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A live feed session opened
    FeedOpened { session: Uuid },
    /// A live feed session was torn down
    FeedClosed { session: Uuid },
    /// SOC connection indicator changed
    ConnectionChanged { status: ConnectionStatus },
    /// Newest threat timeline point moved
    TimelineTick { range: TimeRange, point: TimelinePoint },
    /// An integration connection test finished
    IntegrationTested { id: String, status: IntegrationStatus },
    /// Integration configuration saved
    ConfigurationSaved { at: DateTime<Utc> },
    /// Executive report export acknowledged
    ReportExported { format: ExportFormat },
    /// Threat-intelligence page data refreshed, by hand or on the timer
    ThreatIntelRefreshed { at: DateTime<Utc> },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
    pub sessions: SessionRegistry,
    pub monitor: ConnectionMonitor,
    pub integrations: IntegrationBoard,
    pub events: EventsTable,
    pub hunting: HuntingDesk,
    timelines: RwLock<HashMap<TimeRange, Vec<TimelinePoint>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut rng = StdRng::from_entropy();

        Self {
            monitor: ConnectionMonitor::new(config.monitor.connection_period()),
            integrations: IntegrationBoard::new(config.integrations.clone()),
            events: EventsTable::generate(Utc::now(), &mut rng),
            hunting: HuntingDesk::new(config.hunting.clone()),
            sessions: SessionRegistry::default(),
            timelines: RwLock::new(HashMap::new()),
            event_tx,
            shutdown_tx,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Fire-and-forget broadcast; nobody listening is fine.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Series for `range`, generated on first use and kept so the live
    /// nudge has something to move.
    pub async fn timeline(&self, range: TimeRange) -> Vec<TimelinePoint> {
        if let Some(series) = self.timelines.read().await.get(&range) {
            return series.clone();
        }
        let mut timelines = self.timelines.write().await;
        timelines
            .entry(range)
            .or_insert_with(|| generate_timeline(range, Utc::now(), &mut StdRng::from_entropy()))
            .clone()
    }

    /// Start the connection monitor, the timeline ticker and the threat
    /// page auto-refresh. All stop on [`AppState::shutdown`].
    pub fn spawn_background(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let event_tx = self.event_tx.clone();
        let monitor = self.monitor.start_with_shutdown(
            StdRng::from_entropy(),
            self.shutdown_tx.subscribe(),
            move |status| {
                let _ = event_tx.send(AppEvent::ConnectionChanged { status });
            },
        );

        let state = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let ticker = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut ticker = interval(state.config.monitor.timeline_tick());
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => state.nudge_timelines(&mut rng).await,
                    _ = shutdown_rx.recv() => {
                        info!("timeline ticker shutting down");
                        break;
                    }
                }
            }
        });

        let state = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let refresher = tokio::spawn(async move {
            let mut every = interval(state.config.hunting.refresh_interval());
            every.tick().await;

            loop {
                tokio::select! {
                    _ = every.tick() => {
                        let at = state.hunting.refresh().await;
                        debug!(at = %at, "threat intelligence auto-refresh");
                        state.publish(AppEvent::ThreatIntelRefreshed { at });
                    }
                    _ = shutdown_rx.recv() => {
                        info!("threat intelligence refresher shutting down");
                        break;
                    }
                }
            }
        });

        vec![monitor, ticker, refresher]
    }

    async fn nudge_timelines(&self, rng: &mut StdRng) {
        let mut timelines = self.timelines.write().await;
        for (range, series) in timelines.iter_mut() {
            jitter_last_point(series, rng);
            if let Some(point) = series.last() {
                debug!(range = %range, total = point.total, "timeline nudged");
                self.publish(AppEvent::TimelineTick { range: *range, point: point.clone() });
            }
        }
    }

    /// Stop background tasks and tear down every open feed.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let closed = self.sessions.close_all().await;
        info!(sessions = closed, "SecureWatch state shut down");
    }
}

pub type SharedState = Arc<AppState>;
