//! Threat hunting panel and its endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use securewatch_intel::hunting::{template, HuntRun, QueryTemplate, SavedQuery, QUERY_TEMPLATES};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::handlers::layout::escape_html;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Deserialize)]
pub struct HuntRequest {
    pub query: String,
}

/// GET /api/hunt/templates
pub async fn api_hunt_templates() -> Json<&'static [QueryTemplate]> {
    Json(&QUERY_TEMPLATES)
}

/// GET /api/hunt/templates/{value}
pub async fn api_hunt_template(Path(value): Path<String>) -> ApiResult<Json<&'static QueryTemplate>> {
    Ok(Json(template(&value)?))
}

/// POST /api/hunt
pub async fn api_hunt(
    State(state): State<SharedState>,
    Json(req): Json<HuntRequest>,
) -> ApiResult<Json<HuntRun>> {
    Ok(Json(state.hunting.run(&req.query).await?))
}

/// GET /api/hunt/saved
pub async fn api_saved_hunts(State(state): State<SharedState>) -> Json<Vec<SavedQuery>> {
    Json(state.hunting.saved().await)
}

/// POST /api/hunt/saved
pub async fn api_save_hunt(
    State(state): State<SharedState>,
    Json(req): Json<HuntRequest>,
) -> ApiResult<Json<SavedQuery>> {
    Ok(Json(state.hunting.save(&req.query).await?))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub last_refresh: DateTime<Utc>,
}

/// POST /api/threat/refresh
pub async fn api_threat_refresh(State(state): State<SharedState>) -> Json<RefreshResponse> {
    let at = state.hunting.refresh().await;
    state.publish(AppEvent::ThreatIntelRefreshed { at });
    Json(RefreshResponse { last_refresh: at })
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render_saved(saved: &[SavedQuery]) -> String {
    if saved.is_empty() {
        return r#"<li class="text-muted text-sm">No saved queries yet</li>"#.to_string();
    }
    saved.iter().map(|q| format!(
        r#"<li class="saved-query" data-query="{query}"><span class="font-medium">{name}</span> <span class="text-xs text-muted">{count} results • {created}</span></li>"#,
        query = escape_html(&q.query),
        name = q.name,
        count = q.results_count,
        created = q.created.format("%H:%M:%S"),
    )).collect()
}

/// Query editor, results table and saved list; `hunting.js` drives it.
pub fn render_hunting_panel(saved: &[SavedQuery]) -> String {
    let options: String = QUERY_TEMPLATES.iter().map(|t| format!(
        r#"<option value="{}" title="{}">{}</option>"#,
        t.value, t.description, t.label,
    )).collect();

    format!(r#"
    <div class="card" id="threat-hunting">
        <div class="card-header">
            <div>Threat Hunting</div>
            <select id="hunt-template"><option value="">Query template…</option>{options}</select>
        </div>
        <textarea id="hunt-query" rows="4" class="w-full" placeholder="source:* AND severity:critical"></textarea>
        <div class="d-flex gap-2">
            <button class="btn btn-primary btn-sm" id="hunt-run">Execute Query</button>
            <button class="btn btn-outline btn-sm" id="hunt-save">Save Query</button>
        </div>
        <div class="table-container">
            <table class="table" id="hunt-results">
                <thead><tr><th>Timestamp</th><th>Source</th><th>Severity</th><th>Description</th><th>Assets</th><th>Confidence</th></tr></thead>
                <tbody><tr><td colspan="6" class="text-center text-muted">Run a query to see matches</td></tr></tbody>
            </table>
        </div>
        <div class="card-header"><div>Saved Queries</div></div>
        <ul id="hunt-saved">{saved}</ul>
    </div>"#,
        saved = render_saved(saved),
    )
}
