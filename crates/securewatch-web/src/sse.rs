//! Server-Sent Events (SSE) streaming for real-time UI updates.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use securewatch_feed::{FeedUpdate, LiveFeed};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::handlers::feed::{render_feed_items, FeedQuery};
use crate::sessions::SessionGuard;
use crate::state::{AppEvent, SharedState};

fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("ping")
}

/// Application event stream. Ends when the server shuts down.
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut events = state.subscribe();
    let mut shutdown_rx = state.shutdown_rx();
    let (tx, rx) = mpsc::channel::<Event>(64);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = shutdown_rx.recv() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        let Ok(data) = serde_json::to_string(&event) else { continue };
                        if tx.send(Event::default().data(data)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    Sse::new(ReceiverStream::new(rx).map(Ok::<_, Infallible>)).keep_alive(keep_alive())
}

// ── Live feed stream ──────────────────────────────────────────────────────────

/// One rendered state of the feed panel.
#[derive(Debug, Serialize)]
pub struct FeedFrame {
    #[serde(flatten)]
    pub update: FeedUpdate,
    pub fragment: String,
    pub visible_count: usize,
    pub buffered_count: usize,
    pub auto_scroll: bool,
    pub show_scroll_to_latest: bool,
}

impl FeedFrame {
    pub fn render(feed: &LiveFeed, update: FeedUpdate) -> Self {
        let visible = feed.visible();
        Self {
            fragment: render_feed_items(&visible),
            visible_count: visible.len(),
            buffered_count: feed.buffer().len(),
            auto_scroll: feed.view().auto_scroll,
            show_scroll_to_latest: feed.view().shows_scroll_to_latest(),
            update,
        }
    }
}

/// Opens a feed session for as long as the client stays connected. The first
/// event (`session`) carries the id the control endpoints expect; every
/// later `feed` event is a full re-render of the panel.
pub async fn feed_stream(
    State(state): State<SharedState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let filter = query.into_filter()?;
    let (id, feed, mut updates) = state.sessions.open(&state.config.feed, filter).await;
    state.publish(AppEvent::FeedOpened { session: id });

    let guard = SessionGuard::new(id, state.clone());
    let (tx, rx) = mpsc::channel::<Event>(16);

    tokio::spawn(async move {
        let _guard = guard;

        let opened = Event::default()
            .event("session")
            .data(serde_json::json!({ "session": id }).to_string());
        if tx.send(opened).await.is_err() {
            return;
        }
        if tx.send(frame_event(&feed, FeedUpdate::opened()).await).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!(session = %id, "Feed stream disconnected");
                    break;
                }
                update = updates.recv() => match update {
                    Ok(update) => {
                        if tx.send(frame_event(&feed, update).await).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session = %id, skipped, "Feed stream lagged, re-rendering");
                        if tx.send(frame_event(&feed, FeedUpdate::view_changed(false)).await).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(keep_alive()))
}

async fn frame_event(feed: &Arc<RwLock<LiveFeed>>, update: FeedUpdate) -> Event {
    let frame = FeedFrame::render(&*feed.read().await, update);
    let data = serde_json::to_string(&frame).unwrap_or_else(|_| "{}".to_string());
    Event::default().event("feed").data(data)
}
