//! Threat-intelligence analytics page plus the timeline and correlation APIs.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use securewatch_intel::correlation::{grid, THREAT_TYPES};
use securewatch_intel::kpi::threat_metrics;
use securewatch_intel::{CorrelationCell, HeatBand, TimeRange, TimelinePoint};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::handlers::hunting::render_hunting_panel;
use crate::handlers::layout::{page_header, render_page};
use crate::handlers::soc::render_kpis;
use crate::state::SharedState;

pub async fn threat_page(State(state): State<SharedState>) -> Html<String> {
    let last_refresh = state.hunting.last_refresh().await;
    let saved = state.hunting.saved().await;

    let rows: String = grid().iter().map(|(source, cells)| {
        let tds: String = cells.iter().map(|cell| {
            let band = HeatBand::for_value(cell.value);
            format!(
                r#"<td class="heat-cell {}" title="{} events">{:.2}</td>"#,
                band.css_class(),
                cell.events,
                cell.value,
            )
        }).collect();
        format!(r#"<tr><th>{}</th>{tds}</tr>"#, source.label())
    }).collect();

    let header: String = THREAT_TYPES.iter().map(|t| format!("<th>{t}</th>")).collect();

    let body = format!(r#"
    {header_html}
    {metrics}
    <div class="card" id="correlation-matrix">
        <div class="card-header">
            <div>Threat Correlation Matrix</div>
            <span class="text-muted text-sm">Source × threat type correlation</span>
        </div>
        <div class="table-container">
            <table class="table heat-table">
                <thead><tr><th>Source</th>{header}</tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
        <div class="heat-legend">
            <span class="heat-cell heat-critical">≥ 0.80</span>
            <span class="heat-cell heat-high">≥ 0.60</span>
            <span class="heat-cell heat-elevated">≥ 0.40</span>
            <span class="heat-cell heat-low">≥ 0.20</span>
            <span class="heat-cell heat-minimal">&lt; 0.20</span>
        </div>
    </div>
    {hunting}"#,
        header_html = page_header(
            "Threat Intelligence Analytics",
            "Correlated threat activity across security platforms",
            &format!(
                r#"<span class="text-xs text-muted" id="last-refresh">Last refresh {}</span>
                <button class="btn btn-outline btn-sm" id="threat-refresh">Refresh</button>"#,
                last_refresh.format("%H:%M:%S UTC"),
            ),
        ),
        metrics = render_kpis(&threat_metrics()),
        hunting = render_hunting_panel(&saved),
    );

    Html(render_page("Threat Intelligence", "threat", &body, &["/static/js/hunting.js"]))
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub range: TimeRange,
    pub points: Vec<TimelinePoint>,
}

/// GET /api/timeline?range=
pub async fn api_timeline(
    State(state): State<SharedState>,
    Query(query): Query<TimelineQuery>,
) -> ApiResult<Json<TimelineResponse>> {
    let range: TimeRange = query.range.as_deref().unwrap_or("24h").parse()?;
    let points = state.timeline(range).await;
    Ok(Json(TimelineResponse { range, points }))
}

#[derive(Debug, Serialize)]
pub struct CorrelationEntry {
    #[serde(flatten)]
    pub cell: CorrelationCell,
    pub band: HeatBand,
}

/// GET /api/correlation
pub async fn api_correlation() -> Json<Vec<CorrelationEntry>> {
    let entries = grid()
        .into_iter()
        .flat_map(|(_, cells)| cells)
        .map(|cell| CorrelationEntry { band: HeatBand::for_value(cell.value), cell })
        .collect();
    Json(entries)
}
