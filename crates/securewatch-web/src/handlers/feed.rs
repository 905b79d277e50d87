//! Live alert feed: panel rendering and the per-session control endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use securewatch_common::Severity;
use securewatch_feed::{AlertRecord, FeedFilter, FeedSnapshot, FeedUpdate, FeedView, SeverityFilter, SourceToggles};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::{AppEvent, SharedState};

/// Query string of the feed stream, e.g. `?severity=high&sources=elastic,tenable`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub severity: Option<String>,
    pub sources: Option<String>,
}

impl FeedQuery {
    pub fn into_filter(self) -> securewatch_common::Result<FeedFilter> {
        let severity: SeverityFilter = self.severity.as_deref().unwrap_or("all").parse()?;
        let sources: SourceToggles = self.sources.as_deref().unwrap_or("all").parse()?;
        Ok(FeedFilter::new(severity, sources))
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrollRequest {
    pub offset: u32,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: FeedView,
    pub reset_scroll: bool,
    pub show_scroll_to_latest: bool,
}

impl ViewResponse {
    fn new(view: FeedView, reset_scroll: bool) -> Self {
        Self { view, reset_scroll, show_scroll_to_latest: view.shows_scroll_to_latest() }
    }
}

// ── Control endpoints ─────────────────────────────────────────────────────────

/// GET /api/feed/{id}
pub async fn api_feed_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FeedSnapshot>> {
    let feed = state.sessions.feed(id).await?;
    let snapshot = feed.read().await.snapshot();
    Ok(Json(snapshot))
}

/// POST /api/feed/{id}/scroll
pub async fn api_feed_scroll(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScrollRequest>,
) -> ApiResult<Json<ViewResponse>> {
    let feed = state.sessions.feed(id).await?;
    let view = {
        let mut feed = feed.write().await;
        feed.view_mut().on_scroll(req.offset);
        *feed.view()
    };
    debug!(session = %id, offset = req.offset, auto_scroll = view.auto_scroll, "Feed scrolled");
    state.sessions.notify(id, FeedUpdate::view_changed(false)).await?;
    Ok(Json(ViewResponse::new(view, false)))
}

/// POST /api/feed/{id}/scroll-to-latest
pub async fn api_feed_scroll_to_latest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ViewResponse>> {
    let feed = state.sessions.feed(id).await?;
    let view = {
        let mut feed = feed.write().await;
        feed.view_mut().scroll_to_latest();
        *feed.view()
    };
    state.sessions.notify(id, FeedUpdate::view_changed(true)).await?;
    Ok(Json(ViewResponse::new(view, true)))
}

/// POST /api/feed/{id}/pause
pub async fn api_feed_pause(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ViewResponse>> {
    let feed = state.sessions.feed(id).await?;
    let (view, reset_scroll) = {
        let mut feed = feed.write().await;
        let reset = feed.view_mut().toggle_pause();
        (*feed.view(), reset)
    };
    debug!(session = %id, paused = !view.auto_scroll, "Feed pause toggled");
    state.sessions.notify(id, FeedUpdate::view_changed(reset_scroll)).await?;
    Ok(Json(ViewResponse::new(view, reset_scroll)))
}

/// POST /api/feed/{id}/filter
pub async fn api_feed_filter(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(filter): Json<FeedFilter>,
) -> ApiResult<Json<FeedSnapshot>> {
    let feed = state.sessions.feed(id).await?;
    let snapshot = {
        let mut feed = feed.write().await;
        feed.set_filter(filter);
        feed.snapshot()
    };
    debug!(
        session = %id,
        severity = %snapshot.filter.severity,
        sources = %snapshot.filter.sources.to_query(),
        visible = snapshot.visible_count,
        "Feed filter changed"
    );
    state.sessions.notify(id, FeedUpdate::filter_changed()).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/feed/{id}
pub async fn api_feed_close(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.sessions.close(id).await?;
    state.publish(AppEvent::FeedClosed { session: id });
    Ok(StatusCode::NO_CONTENT)
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn severity_text_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "text-danger",
        Severity::High     => "text-warning",
        Severity::Medium   => "text-caution",
        Severity::Low      => "text-success",
    }
}

/// Alert cards for the feed panel body, newest first.
pub fn render_feed_items(alerts: &[&AlertRecord]) -> String {
    if alerts.is_empty() {
        return r#"<div class="feed-empty text-center text-muted">No alerts matching current filters</div>"#.to_string();
    }

    alerts.iter().map(|alert| {
        let new_badge = if alert.is_new { r#"<span class="badge badge-primary">NEW</span>"# } else { "" };
        format!(r#"
        <div class="alert-card severity-{sev}{fresh}" data-alert-id="{id}">
            <div class="alert-card-head">
                <span class="{sev_class} alert-severity">{sev_upper}</span>
                {new_badge}
                <span class="alert-source text-muted">{source}</span>
            </div>
            <h4 class="alert-type">{kind}</h4>
            <p class="text-muted text-xs">Host: {host}</p>
            <p class="text-muted text-xs alert-description">{description}</p>
            <div class="alert-card-foot">
                <span class="text-xs text-muted">{time}</span>
                <button class="btn btn-ghost btn-sm">Investigate</button>
            </div>
        </div>"#,
            sev = alert.severity.as_str(),
            fresh = if alert.is_new { " is-new" } else { "" },
            id = alert.id,
            sev_class = severity_text_class(alert.severity),
            sev_upper = alert.severity.as_str().to_uppercase(),
            source = alert.source.label(),
            kind = alert.kind,
            host = alert.hostname,
            description = alert.description,
            time = alert.timestamp.format("%H:%M:%S"),
        )
    }).collect()
}

/// Feed panel shell; `feed.js` opens the stream with the panel's filter and
/// fills `#feed-items`.
pub fn render_feed_panel(filter: &FeedFilter) -> String {
    format!(r#"
    <div class="card feed-panel" id="live-feed" data-severity="{severity}" data-sources="{sources}">
        <div class="card-header">
            <div class="d-flex align-center gap-2">
                <span>Live Alert Feed</span>
                <span class="live-indicator text-success"><span class="status-dot dot-success"></span>Live</span>
            </div>
            <button class="btn btn-ghost btn-sm" id="feed-pause">Pause</button>
        </div>
        <div class="text-muted text-sm feed-summary"><span id="feed-count">0</span> active alerts • Auto-refresh every 5-15s</div>
        <div class="feed-items" id="feed-items"></div>
        <div class="feed-footer" id="feed-scroll-latest" hidden>
            <button class="btn btn-outline btn-sm w-full">Scroll to Latest Alerts</button>
        </div>
    </div>"#,
        severity = filter.severity,
        sources = filter.sources.to_query(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use securewatch_common::{SecureWatchError, Source};
    use securewatch_feed::AlertGenerator;

    #[test]
    fn test_query_defaults_to_everything() {
        let filter = FeedQuery::default().into_filter().unwrap();
        assert_eq!(filter, FeedFilter::default());
    }

    #[test]
    fn test_query_parses_severity_and_sources() {
        let query = FeedQuery { severity: Some("high".into()), sources: Some("elastic,tenable".into()) };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.severity, SeverityFilter::Only(Severity::High));
        assert!(filter.sources.is_enabled(Source::Elastic));
        assert!(!filter.sources.is_enabled(Source::Defender));
    }

    #[test]
    fn test_query_rejects_unknown_severity() {
        let query = FeedQuery { severity: Some("urgent".into()), sources: None };
        assert!(matches!(query.into_filter(), Err(SecureWatchError::InvalidFilter(_))));
    }

    #[test]
    fn test_render_marks_new_alert() {
        let mut generator = AlertGenerator::new(StdRng::seed_from_u64(3));
        let fresh = generator.generate_at(Utc::now());
        let mut old = generator.generate_at(Utc::now());
        old.is_new = false;

        let html = render_feed_items(&[&fresh, &old]);
        assert_eq!(html.matches("NEW</span>").count(), 1);
        assert!(html.contains(&fresh.id.to_string()));
        assert!(html.contains(&format!("Host: {}", old.hostname)));
    }

    #[test]
    fn test_panel_carries_filter() {
        let filter = FeedQuery { severity: Some("critical".into()), sources: Some("defender".into()) }
            .into_filter()
            .unwrap();
        let html = render_feed_panel(&filter);
        assert!(html.contains(r#"data-severity="critical""#));
        assert!(html.contains(r#"data-sources="defender""#));
    }

    #[test]
    fn test_render_empty() {
        assert!(render_feed_items(&[]).contains("No alerts matching current filters"));
    }
}
