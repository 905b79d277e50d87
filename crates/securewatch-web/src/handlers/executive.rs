//! Executive security summary — the landing page.

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use securewatch_intel::executive::{
    count_by_status, export, ExportReceipt, ExportRequest, ItemStatus, COMPLIANCE, EXPORT_DELAY,
    HEADLINE_METRICS, POSTURE_TREND, RISK_HEAT_MAP, SUMMARY_ITEMS,
};

use crate::handlers::layout::{page_header, render_page};
use crate::state::{AppEvent, SharedState};

pub async fn executive_page() -> Html<String> {
    let metrics: String = HEADLINE_METRICS.iter().map(|m| {
        let class = if m.improving { "text-success" } else { "text-danger" };
        format!(r#"
        <div class="stat-card card-hover">
            <div class="stat-label">{}</div>
            <div class="stat-value text-gradient">{}</div>
            <div class="text-xs {class}">{}</div>
        </div>"#, m.title, m.value, m.change)
    }).collect();

    let trend_rows: String = POSTURE_TREND.iter().map(|p| format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} min</td></tr>",
        p.period, p.security_score, p.compliance_score, p.incident_response_min,
    )).collect();

    let heat_map: String = RISK_HEAT_MAP.iter().map(|d| format!(r#"
        <div class="risk-tile {badge}">
            <div class="risk-tile-name">{}</div>
            <div class="text-xs">{} assets • {} risk</div>
            <div class="stat-value">{}</div>
        </div>"#,
        d.department, d.assets, d.risk_level.label(), d.score,
        badge = d.risk_level.badge_class(),
    )).collect();

    let compliance: String = COMPLIANCE.iter().map(|c| format!(r#"
        <div class="d-flex justify-between"><span>{}</span><span>{}% ({} controls)</span></div>
        <div class="progress-track"><div class="progress-bar" style="width:{}%"></div></div>"#,
        c.name, c.percent, c.controls, c.percent,
    )).collect();

    let items: String = SUMMARY_ITEMS.iter().map(|i| format!(r#"
        <tr>
            <td>{}</td>
            <td><div class="font-medium">{}</div><div class="text-xs text-muted">{}</div></td>
            <td><span class="badge {}">{}</span></td>
            <td class="{}">{}</td>
            <td class="text-muted">{}</td>
        </tr>"#,
        i.category, i.title, i.description,
        i.impact.badge_class(), i.impact.label(),
        i.status.css_class(), i.status.label(),
        i.timeline,
    )).collect();

    let tally: String = ItemStatus::ALL.iter().map(|s| format!(
        r#"<div class="stat-card"><div class="stat-value {}">{}</div><div class="stat-label">{}</div></div>"#,
        s.css_class(), count_by_status(*s), s.label(),
    )).collect();

    let actions = r#"
        <select id="export-range"><option value="weekly">Weekly</option><option value="monthly" selected>Monthly</option><option value="quarterly">Quarterly</option></select>
        <button class="btn btn-outline" data-export="pdf">PDF Report</button>
        <button class="btn btn-outline" data-export="png">PNG Image</button>"#;

    let body = format!(r#"
    {header}
    <p class="text-muted text-sm">Last updated: {updated}</p>
    <div class="stats-grid">{metrics}</div>
    <div class="grid-2">
        <div class="card">
            <div class="card-header"><div>Security Posture Trends</div></div>
            <table class="table">
                <thead><tr><th>Period</th><th>Security Score</th><th>Compliance</th><th>Incident Response</th></tr></thead>
                <tbody>{trend_rows}</tbody>
            </table>
        </div>
        <div class="card">
            <div class="card-header"><div>Risk Heat Map</div></div>
            <div class="risk-grid">{heat_map}</div>
        </div>
    </div>
    <div class="grid-2">
        <div class="card">
            <div class="card-header"><div>Compliance Dashboard</div></div>
            {compliance}
        </div>
        <div class="card">
            <div class="card-header"><div>Executive Summary</div></div>
            <table class="table">
                <thead><tr><th>Category</th><th>Item</th><th>Impact</th><th>Status</th><th>Timeline</th></tr></thead>
                <tbody>{items}</tbody>
            </table>
            <div class="stats-grid">{tally}</div>
        </div>
    </div>"#,
        header = page_header(
            "Executive Security Summary",
            "Strategic security insights and business-focused metrics for leadership",
            actions,
        ),
        updated = Utc::now().format("%b %d, %Y %H:%M UTC"),
    );

    Html(render_page("Executive Summary", "executive", &body, &["/static/js/executive.js"]))
}

/// POST /api/executive/export
pub async fn api_export(
    State(state): State<SharedState>,
    Json(request): Json<ExportRequest>,
) -> Json<ExportReceipt> {
    let receipt = export(request, EXPORT_DELAY).await;
    state.publish(AppEvent::ReportExported { format: receipt.format });
    Json(receipt)
}
