//! Axum router — maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    events::api_events,
    executive::{api_export, executive_page},
    feed::{
        api_feed_close, api_feed_filter, api_feed_pause, api_feed_scroll,
        api_feed_scroll_to_latest, api_feed_snapshot,
    },
    hunting::{
        api_hunt, api_hunt_template, api_hunt_templates, api_save_hunt, api_saved_hunts,
        api_threat_refresh,
    },
    integrations::{
        api_integrations, api_save_integrations, api_test_all, api_test_integration,
        integrations_page,
    },
    soc::{soc_page, SOC_PATH},
    system::{api_status, not_found},
    threat::{api_correlation, api_timeline, threat_page},
    vulnerability::{vulnerability_page, VULNERABILITY_PATH},
};
use crate::sse::{feed_stream, sse_handler};
use crate::state::SharedState;

/// Build and return the full Axum router.
pub fn build_router(state: SharedState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        // Pages
        .route("/",                               get(executive_page))
        .route("/executive-security-summary",     get(executive_page))
        .route(SOC_PATH,                          get(soc_page))
        .route("/threat-intelligence-analytics",  get(threat_page))
        .route(VULNERABILITY_PATH,                get(vulnerability_page))
        .route("/api-integration-configuration",  get(integrations_page))

        // SSE streaming
        .route("/api/stream",      get(sse_handler))
        .route("/api/feed/events", get(feed_stream))

        // Live feed session controls
        .route("/api/feed/{id}",                  get(api_feed_snapshot).delete(api_feed_close))
        .route("/api/feed/{id}/scroll",           post(api_feed_scroll))
        .route("/api/feed/{id}/scroll-to-latest", post(api_feed_scroll_to_latest))
        .route("/api/feed/{id}/pause",            post(api_feed_pause))
        .route("/api/feed/{id}/filter",           post(api_feed_filter))

        // API endpoints
        .route("/api/status",                     get(api_status))
        .route("/api/timeline",                   get(api_timeline))
        .route("/api/events",                     get(api_events))
        .route("/api/correlation",                get(api_correlation))
        .route("/api/threat/refresh",             post(api_threat_refresh))
        .route("/api/hunt",                       post(api_hunt))
        .route("/api/hunt/templates",             get(api_hunt_templates))
        .route("/api/hunt/templates/{value}",     get(api_hunt_template))
        .route("/api/hunt/saved",                 get(api_saved_hunts).post(api_save_hunt))
        .route("/api/integrations",               get(api_integrations))
        .route("/api/integrations/test-all",      post(api_test_all))
        .route("/api/integrations/save",          post(api_save_integrations))
        .route("/api/integrations/{id}/test",     post(api_test_integration))
        .route("/api/executive/export",           post(api_export))

        // Static files
        .nest_service("/static", static_dir)
        .fallback(not_found)

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
