//! Vulnerability management — the events table pinned to the Tenable tab.

use axum::extract::{Query, State};
use axum::response::Html;
use securewatch_common::Source;

use crate::error::ApiResult;
use crate::handlers::events::{render_events_table, EventsQuery};
use crate::handlers::layout::{page_header, render_page};
use crate::state::SharedState;

pub const VULNERABILITY_PATH: &str = "/vulnerability-management-dashboard";

pub async fn vulnerability_page(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Html<String>> {
    let query = EventsQuery { source: Some(Source::Tenable.to_string()), ..query };
    let view = query.resolve()?;

    let body = format!(
        "{}{}",
        page_header(
            "Vulnerability Management",
            "Scan findings, asset discovery and compliance checks from Tenable",
            "",
        ),
        render_events_table(&state.events, &view, VULNERABILITY_PATH, &[Source::Tenable]),
    );
    Ok(Html(render_page("Vulnerability Management", "vulnerability", &body, &[])))
}
