//! Connection status API and the 404 page.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::Html;
use axum::Json;
use securewatch_intel::ConnectionStatus;
use serde::Serialize;

use crate::handlers::layout::{escape_html, render_page};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: ConnectionStatus,
    pub label: &'static str,
    pub feed_sessions: usize,
}

/// GET /api/status
pub async fn api_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let status = state.monitor.current().await;
    Json(StatusResponse {
        status,
        label: status.label(),
        feed_sessions: state.sessions.len().await,
    })
}

pub async fn not_found(uri: Uri) -> (StatusCode, Html<String>) {
    let body = format!(r#"
    <div class="empty-state">
        <h1 class="page-title">404</h1>
        <p class="text-muted">No page at <code>{}</code>.</p>
        <a href="/" class="btn btn-primary">Back to dashboard</a>
    </div>"#, escape_html(uri.path()));
    (StatusCode::NOT_FOUND, Html(render_page("Page Not Found", "", &body, &[])))
}
