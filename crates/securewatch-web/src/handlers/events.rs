//! "Top 10 Security Events" table, shared by the SOC and vulnerability pages.

use axum::extract::{Query, State};
use axum::Json;
use securewatch_common::{Result, Severity, Source};
use securewatch_feed::{SeverityFilter, SourceToggles};
use securewatch_intel::events::EventStatus;
use securewatch_intel::{EventSortKey, EventsTable, SecurityEvent, SortConfig, SortDirection};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct EventsQuery {
    /// Active tab
    pub source: Option<String>,
    pub severity: Option<String>,
    /// Enabled sources, comma list
    pub sources: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventsView {
    pub tab: Source,
    pub sources: SourceToggles,
    pub severity: SeverityFilter,
    pub sort: SortConfig,
}

impl EventsQuery {
    pub fn resolve(&self) -> Result<EventsView> {
        let tab = match self.source.as_deref() {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => Source::Elastic,
        };
        let sort = match self.sort.as_deref() {
            Some(key) if !key.is_empty() => SortConfig {
                key: key.parse::<EventSortKey>()?,
                direction: match self.dir.as_deref() {
                    Some(dir) if !dir.is_empty() => dir.parse::<SortDirection>()?,
                    _ => SortDirection::Asc,
                },
            },
            _ => SortConfig::default(),
        };
        Ok(EventsView {
            tab,
            sources: self.sources.as_deref().unwrap_or("all").parse()?,
            severity: self.severity.as_deref().unwrap_or("all").parse()?,
            sort,
        })
    }
}

impl EventsView {
    fn severity(&self) -> Option<Severity> {
        match self.severity {
            SeverityFilter::All => None,
            SeverityFilter::Only(s) => Some(s),
        }
    }

    pub fn rows<'a>(&self, table: &'a EventsTable) -> Vec<&'a SecurityEvent> {
        table.rows(self.tab, self.sources.is_enabled(self.tab), self.severity(), self.sort)
    }

    /// Query string that reproduces this view with `tab` and `sort` swapped in.
    fn href(&self, base: &str, tab: Source, sort: SortConfig) -> String {
        format!(
            "{base}?source={}&severity={}&sources={}&sort={}&dir={}",
            tab,
            self.severity,
            self.sources.to_query(),
            sort_key_str(sort.key),
            dir_str(sort.direction),
        )
    }
}

fn sort_key_str(key: EventSortKey) -> &'static str {
    match key {
        EventSortKey::Timestamp      => "timestamp",
        EventSortKey::Severity       => "severity",
        EventSortKey::RiskScore      => "risk_score",
        EventSortKey::AffectedAssets => "affected_assets",
    }
}

fn dir_str(dir: SortDirection) -> &'static str {
    match dir {
        SortDirection::Asc  => "asc",
        SortDirection::Desc => "desc",
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub source: Source,
    pub sort: SortConfig,
    pub rows: Vec<SecurityEvent>,
}

/// GET /api/events?source=&severity=&sources=&sort=&dir=
pub async fn api_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<EventsResponse>> {
    let view = query.resolve()?;
    Ok(Json(EventsResponse {
        source: view.tab,
        sort: view.sort,
        rows: view.rows(&state.events).into_iter().cloned().collect(),
    }))
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn status_badge(status: EventStatus) -> String {
    format!(r#"<span class="badge {}">{}</span>"#, status.badge_class(), status.label())
}

pub fn render_events_table(table: &EventsTable, view: &EventsView, base: &str, tabs: &[Source]) -> String {
    let tab_links: String = tabs.iter().map(|tab| {
        let count = if view.sources.is_enabled(*tab) { table.tab_len(*tab) } else { 0 };
        let active = if *tab == view.tab { " active" } else { "" };
        format!(
            r#"<a class="tab{active}" href="{href}">{label} <span class="badge badge-outline">{count}</span></a>"#,
            href = view.href(base, *tab, view.sort),
            label = tab.label(),
        )
    }).collect();

    let columns = [
        (None, "Event Type"),
        (Some(EventSortKey::Severity), "Severity"),
        (None, "Status"),
        (Some(EventSortKey::Timestamp), "Timestamp"),
        (Some(EventSortKey::AffectedAssets), "Assets"),
        (None, "Assigned To"),
        (Some(EventSortKey::RiskScore), "Risk Score"),
    ];
    let headers: String = columns.iter().map(|(key, label)| match key {
        Some(key) => {
            let arrow = match (view.sort.key == *key, view.sort.direction) {
                (true, SortDirection::Asc)  => " ▲",
                (true, SortDirection::Desc) => " ▼",
                (false, _) => "",
            };
            format!(
                r#"<th><a href="{}">{label}{arrow}</a></th>"#,
                view.href(base, view.tab, view.sort.toggled(*key)),
            )
        }
        None => format!("<th>{label}</th>"),
    }).collect();

    let rows = view.rows(table);
    let body: String = if rows.is_empty() {
        r#"<tr><td colspan="7" class="text-center text-muted">No events for this source and filter.</td></tr>"#.to_string()
    } else {
        rows.iter().map(|e| format!(r#"
            <tr>
                <td>{event_type}</td>
                <td><span class="badge {sev_class}">{severity}</span></td>
                <td>{status}</td>
                <td class="text-muted">{time}</td>
                <td>{assets}</td>
                <td>{assignee}</td>
                <td><span class="score-value">{risk}</span></td>
            </tr>"#,
            event_type = e.event_type,
            sev_class = e.severity.badge_class(),
            severity = e.severity.label(),
            status = status_badge(e.status),
            time = e.timestamp.format("%Y-%m-%d %H:%M"),
            assets = e.affected_assets,
            assignee = e.assigned_to.unwrap_or("Unassigned"),
            risk = e.risk_score,
        )).collect()
    };

    format!(r#"
    <div class="card" id="events-table">
        <div class="card-header"><div>Top 10 Security Events</div></div>
        <div class="tabs">{tab_links}</div>
        <div class="table-container">
            <table class="table">
                <thead><tr>{headers}</tr></thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    </div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use securewatch_common::SecureWatchError;

    #[test]
    fn test_default_view() {
        let view = EventsQuery::default().resolve().unwrap();
        assert_eq!(view.tab, Source::Elastic);
        assert_eq!(view.sort, SortConfig::default());
        assert_eq!(view.severity, SeverityFilter::All);
    }

    #[test]
    fn test_sort_without_dir_is_ascending() {
        let query = EventsQuery { sort: Some("risk_score".into()), ..EventsQuery::default() };
        let view = query.resolve().unwrap();
        assert_eq!(view.sort.key, EventSortKey::RiskScore);
        assert_eq!(view.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_bad_sort_key() {
        let query = EventsQuery { sort: Some("colour".into()), ..EventsQuery::default() };
        assert!(matches!(query.resolve(), Err(SecureWatchError::InvalidFilter(_))));
    }

    #[test]
    fn test_header_links_toggle_sort() {
        let table = EventsTable::generate(chrono::Utc::now(), &mut rand::thread_rng());
        let view = EventsQuery { sort: Some("risk_score".into()), dir: Some("asc".into()), ..EventsQuery::default() }
            .resolve()
            .unwrap();
        let html = render_events_table(&table, &view, "/security-operations-center-overview", &Source::ALL);
        assert!(html.contains("sort=risk_score&dir=desc"));
        assert!(html.contains("sort=severity&dir=asc"));
        assert!(html.contains("Risk Score ▲"));
    }
}
