//! SOC overview — KPIs, global controls, threat timeline, live feed and the
//! security events table.

use axum::extract::{Query, State};
use axum::response::Html;
use securewatch_common::{Severity, Source};
use securewatch_feed::FeedFilter;
use securewatch_intel::kpi::{soc_kpis, KpiCard};
use securewatch_intel::{ConnectionStatus, TimeRange, TimelinePoint};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::handlers::events::{render_events_table, EventsQuery, EventsView};
use crate::handlers::feed::render_feed_panel;
use crate::handlers::layout::{page_header, render_page};
use crate::state::SharedState;

pub const SOC_PATH: &str = "/security-operations-center-overview";

#[derive(Debug, Default, Deserialize)]
pub struct SocQuery {
    pub range: Option<String>,
    pub severity: Option<String>,
    pub sources: Option<String>,
    pub source: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl SocQuery {
    fn events_query(&self) -> EventsQuery {
        EventsQuery {
            source: self.source.clone(),
            severity: self.severity.clone(),
            sources: self.sources.clone(),
            sort: self.sort.clone(),
            dir: self.dir.clone(),
        }
    }
}

pub async fn soc_page(
    State(state): State<SharedState>,
    Query(query): Query<SocQuery>,
) -> ApiResult<Html<String>> {
    let range: TimeRange = query.range.as_deref().unwrap_or("24h").parse()?;
    let view = query.events_query().resolve()?;
    let filter = FeedFilter::new(view.severity, view.sources.clone());

    let status = state.monitor.current().await;
    let timeline = state.timeline(range).await;

    let body = [
        page_header(
            "Security Operations Center",
            "Real-time monitoring across every connected security platform",
            &connection_badge(status),
        ),
        render_controls(range, &view),
        render_kpis(&soc_kpis()),
        format!(
            r#"<div class="grid-soc">{}{}</div>"#,
            render_timeline(range, &timeline),
            render_feed_panel(&filter),
        ),
        render_events_table(&state.events, &view, SOC_PATH, &Source::ALL),
    ]
    .concat();

    Ok(Html(render_page("SOC Overview", "soc", &body, &["/static/js/feed.js"])))
}

fn connection_badge(status: ConnectionStatus) -> String {
    format!(
        r#"<span class="connection-status {}" id="connection-status"><span class="status-dot"></span>{}</span>"#,
        status.css_class(),
        status.label(),
    )
}

fn render_controls(range: TimeRange, view: &EventsView) -> String {
    let ranges: String = TimeRange::ALL.iter().map(|r| {
        let selected = if *r == range { " selected" } else { "" };
        format!(r#"<option value="{r}"{selected}>{}</option>"#, r.label())
    }).collect();

    let severities: String = std::iter::once(("all", "All Severities"))
        .chain(Severity::ALL.iter().map(|s| (s.as_str(), s.label())))
        .map(|(value, label)| {
            let selected = if view.severity.as_str() == value { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{label}</option>"#)
        })
        .collect();

    let sources: String = Source::ALL.iter().map(|s| {
        let checked = if view.sources.is_enabled(*s) { " checked" } else { "" };
        format!(
            r#"<label class="source-toggle"><input type="checkbox" data-source="{s}"{checked}> {}</label>"#,
            s.label()
        )
    }).collect();

    format!(r#"
    <form class="card controls-bar" method="get" action="{SOC_PATH}" id="global-controls">
        <label>Time range <select name="range">{ranges}</select></label>
        <label>Severity <select name="severity">{severities}</select></label>
        <div class="d-flex gap-2">{sources}</div>
        <input type="hidden" name="sources" value="{enabled}">
        <input type="hidden" name="source" value="{tab}">
        <button class="btn btn-primary btn-sm" type="submit">Apply</button>
    </form>"#,
        enabled = view.sources.to_query(),
        tab = view.tab,
    )
}

pub fn render_kpis(cards: &[KpiCard]) -> String {
    let cards: String = cards.iter().map(|card| {
        let sparkline = if card.sparkline.is_empty() {
            String::new()
        } else {
            format!(
                r#"<svg class="sparkline {}" width="64" height="32"><polyline fill="none" stroke="currentColor" stroke-width="1.5" points="{}"/></svg>"#,
                card.status.css_class(),
                card.sparkline_points(),
            )
        };
        format!(r#"
        <div class="stat-card card-hover">
            <div class="d-flex justify-between">
                <div class="stat-label {status}">{title}</div>
                <div class="text-xs {change_class}">{arrow} {change}</div>
            </div>
            <div class="d-flex justify-between align-end">
                <div class="stat-value">{value}</div>
                {sparkline}
            </div>
        </div>"#,
            status = card.status.css_class(),
            title = card.title,
            change_class = card.change_type.css_class(),
            arrow = card.change_type.arrow(),
            change = card.change,
            value = card.value,
        )
    }).collect();

    format!(r#"<div class="stats-grid">{cards}</div>"#)
}

/// Stacked severity bars, oldest on the left.
fn render_timeline(range: TimeRange, series: &[TimelinePoint]) -> String {
    let peak = series.iter().map(|p| p.total).max().unwrap_or(0).max(1);
    let bars: String = series.iter().map(|p| {
        let pct = |v: u32| v as f64 / peak as f64 * 100.0;
        format!(
            r#"<div class="timeline-bar" title="{time}: {total} threats">
                <div class="seg seg-critical" style="height:{c:.1}%"></div>
                <div class="seg seg-high" style="height:{h:.1}%"></div>
                <div class="seg seg-medium" style="height:{m:.1}%"></div>
                <div class="seg seg-low" style="height:{l:.1}%"></div>
            </div>"#,
            time = p.time,
            total = p.total,
            c = pct(p.critical),
            h = pct(p.high),
            m = pct(p.medium),
            l = pct(p.low),
        )
    }).collect();

    let latest = series.last().map_or(0, |p| p.total);
    format!(r#"
    <div class="card" id="threat-timeline" data-range="{range}">
        <div class="card-header">
            <div>Threat Timeline — {label}</div>
            <span class="text-muted text-sm">Latest: <span id="timeline-latest">{latest}</span> threats</span>
        </div>
        <div class="timeline-chart">{bars}</div>
    </div>"#,
        label = range.label(),
    )
}
