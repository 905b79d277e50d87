//! API integration configuration page and the connection-test endpoints.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use securewatch_intel::integrations::{BoardSnapshot, StatusCounts};
use securewatch_intel::IntegrationStatus;
use serde::Serialize;

use crate::error::ApiResult;
use crate::handlers::layout::{page_header, render_page};
use crate::state::{AppEvent, SharedState};

pub async fn integrations_page(State(state): State<SharedState>) -> Html<String> {
    let board = state.integrations.snapshot().await;
    let counts = board.counts;

    let cards: String = board.integrations.iter().map(|i| {
        let tested = i
            .last_tested
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        format!(r#"
        <div class="card integration-card" data-integration="{id}">
            <div class="card-header">
                <div class="d-flex align-center gap-2">
                    <span class="status-dot {dot}"></span>
                    <span>{name}</span>
                </div>
                <span class="badge badge-outline" data-status>{status}</span>
            </div>
            <p class="text-muted text-sm">{description}</p>
            <div class="d-flex justify-between align-center">
                <span class="text-xs text-muted">Last tested: {tested}</span>
                <button class="btn btn-outline btn-sm" data-test="{id}">Test Connection</button>
            </div>
        </div>"#,
            id = i.id,
            dot = i.status.dot_class(),
            name = i.name,
            status = i.status.as_str(),
            description = i.description,
        )
    }).collect();

    let saved = board
        .last_saved
        .map(|t| format!("Last saved {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "Not saved yet".to_string());

    let actions = r#"
        <button class="btn btn-outline" id="test-all">Test All Connections</button>
        <button class="btn btn-primary" id="save-config">Save Configuration</button>"#;

    let body = format!(r#"
    {header}
    <div class="stats-grid">
        <div class="stat-card"><div class="stat-value text-success">{connected}</div><div class="stat-label">Connected</div></div>
        <div class="stat-card"><div class="stat-value text-warning">{warning}</div><div class="stat-label">Warning</div></div>
        <div class="stat-card"><div class="stat-value text-danger">{disconnected}</div><div class="stat-label">Disconnected</div></div>
        <div class="stat-card"><div class="stat-value">{total}</div><div class="stat-label">Total</div></div>
    </div>
    <p class="text-muted text-sm" id="last-saved">{saved}</p>
    <div class="grid-2">{cards}</div>"#,
        header = page_header(
            "API Integration Configuration",
            "Manage secure connections to external security platforms",
            actions,
        ),
        connected = counts.connected,
        warning = counts.warning,
        disconnected = counts.disconnected,
        total = counts.total,
    );

    Html(render_page("API Integrations", "integrations", &body, &["/static/js/integrations.js"]))
}

/// GET /api/integrations
pub async fn api_integrations(State(state): State<SharedState>) -> Json<BoardSnapshot> {
    Json(state.integrations.snapshot().await)
}

#[derive(Debug, Serialize)]
pub struct TestResult {
    pub id: String,
    pub status: IntegrationStatus,
    pub counts: StatusCounts,
}

/// POST /api/integrations/{id}/test
pub async fn api_test_integration(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TestResult>> {
    let mut rng = StdRng::from_entropy();
    let status = state.integrations.probe(&id, &mut rng).await?;
    state.publish(AppEvent::IntegrationTested { id: id.clone(), status });
    Ok(Json(TestResult { id, status, counts: state.integrations.status_counts().await }))
}

/// POST /api/integrations/test-all
pub async fn api_test_all(State(state): State<SharedState>) -> ApiResult<Json<BoardSnapshot>> {
    let mut rng = StdRng::from_entropy();
    let results = state.integrations.probe_all(&mut rng).await?;
    for (id, status) in results {
        state.publish(AppEvent::IntegrationTested { id, status });
    }
    Ok(Json(state.integrations.snapshot().await))
}

#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub saved_at: DateTime<Utc>,
}

/// POST /api/integrations/save
pub async fn api_save_integrations(State(state): State<SharedState>) -> Json<SaveResult> {
    let saved_at = state.integrations.save().await;
    state.publish(AppEvent::ConfigurationSaved { at: saved_at });
    Json(SaveResult { saved_at })
}
