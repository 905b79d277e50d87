//! Executive summary page data. All tables are fixed.

use chrono::{DateTime, Utc};
use securewatch_common::Severity;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub const EXPORT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
pub struct HeadlineMetric {
    pub title: &'static str,
    pub value: &'static str,
    pub change: &'static str,
    /// Whether the change is good news. Falling response time is.
    pub improving: bool,
}

pub const HEADLINE_METRICS: [HeadlineMetric; 4] = [
    HeadlineMetric { title: "Overall Security Score", value: "92/100", change: "+5%", improving: true },
    HeadlineMetric { title: "Incident Response Time", value: "12 min", change: "-18%", improving: true },
    HeadlineMetric { title: "Compliance Status", value: "98.2%", change: "+2.1%", improving: true },
    HeadlineMetric { title: "Security ROI", value: "$2.4M", change: "+12%", improving: true },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrendPoint {
    pub period: &'static str,
    pub security_score: u32,
    pub compliance_score: u32,
    pub incident_response_min: u32,
}

const fn trend(period: &'static str, security_score: u32, compliance_score: u32, incident_response_min: u32) -> TrendPoint {
    TrendPoint { period, security_score, compliance_score, incident_response_min }
}

pub const POSTURE_TREND: [TrendPoint; 8] = [
    trend("Jan 2025", 85, 92, 18),
    trend("Feb 2025", 87, 94, 16),
    trend("Mar 2025", 89, 96, 15),
    trend("Apr 2025", 88, 95, 17),
    trend("May 2025", 91, 97, 14),
    trend("Jun 2025", 90, 98, 13),
    trend("Jul 2025", 92, 98, 12),
    trend("Aug 2025", 92, 98, 12),
];

// ── Risk heat map ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DepartmentRisk {
    pub department: &'static str,
    pub assets: u32,
    pub risk_level: Severity,
    pub score: u32,
}

pub const RISK_HEAT_MAP: [DepartmentRisk; 6] = [
    DepartmentRisk { department: "IT Operations", assets: 245, risk_level: Severity::Low, score: 92 },
    DepartmentRisk { department: "Finance", assets: 89, risk_level: Severity::Medium, score: 78 },
    DepartmentRisk { department: "Human Resources", assets: 156, risk_level: Severity::Low, score: 88 },
    DepartmentRisk { department: "Sales & Marketing", assets: 198, risk_level: Severity::High, score: 65 },
    DepartmentRisk { department: "Operations", assets: 312, risk_level: Severity::Medium, score: 74 },
    DepartmentRisk { department: "R&D", assets: 134, risk_level: Severity::Critical, score: 45 },
];

// ── Compliance ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComplianceSlice {
    pub name: &'static str,
    pub percent: u32,
    pub controls: u32,
}

pub const COMPLIANCE: [ComplianceSlice; 4] = [
    ComplianceSlice { name: "Compliant", percent: 82, controls: 164 },
    ComplianceSlice { name: "In Progress", percent: 12, controls: 24 },
    ComplianceSlice { name: "Non-Compliant", percent: 4, controls: 8 },
    ComplianceSlice { name: "Not Applicable", percent: 2, controls: 4 },
];

// ── Summary items ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Resolved,
    InProgress,
    Planned,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Resolved, ItemStatus::InProgress, ItemStatus::Planned];

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Resolved   => "Resolved",
            ItemStatus::InProgress => "In Progress",
            ItemStatus::Planned    => "Planned",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ItemStatus::Resolved   => "text-success",
            ItemStatus::InProgress => "text-warning",
            ItemStatus::Planned    => "text-muted",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryItem {
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub impact: Severity,
    pub status: ItemStatus,
    pub timeline: &'static str,
}

pub const SUMMARY_ITEMS: [SummaryItem; 5] = [
    SummaryItem {
        category: "Critical Incident",
        title: "Phishing Campaign Detected",
        description: "Advanced persistent threat targeting the finance department with credential harvesting attempts",
        impact: Severity::High,
        status: ItemStatus::Resolved,
        timeline: "Aug 15-18, 2025",
    },
    SummaryItem {
        category: "Remediation",
        title: "Vulnerability Patching Completed",
        description: "Critical security patches applied to 95% of infrastructure within SLA requirements",
        impact: Severity::Medium,
        status: ItemStatus::Resolved,
        timeline: "Aug 10-20, 2025",
    },
    SummaryItem {
        category: "Compliance",
        title: "SOC 2 Type II Audit",
        description: "Annual compliance audit scheduled, preliminary assessment shows strong controls",
        impact: Severity::Low,
        status: ItemStatus::InProgress,
        timeline: "Sep 1-15, 2025",
    },
    SummaryItem {
        category: "Risk Assessment",
        title: "Third-Party Vendor Review",
        description: "Comprehensive security assessment of critical vendor relationships and data access",
        impact: Severity::Medium,
        status: ItemStatus::Planned,
        timeline: "Sep 20-30, 2025",
    },
    SummaryItem {
        category: "Infrastructure",
        title: "Zero Trust Implementation",
        description: "Phase 2 rollout of zero trust architecture across remote access and cloud services",
        impact: Severity::High,
        status: ItemStatus::InProgress,
        timeline: "Aug 1 - Oct 31, 2025",
    },
];

pub fn count_by_status(status: ItemStatus) -> usize {
    SUMMARY_ITEMS.iter().filter(|i| i.status == status).count()
}

// ── Export ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(default)]
    pub range: ReportPeriod,
    #[serde(default = "default_department")]
    pub department: String,
}

fn default_department() -> String { "all".to_string() }

#[derive(Debug, Clone, Serialize)]
pub struct ExportReceipt {
    pub format: ExportFormat,
    pub range: ReportPeriod,
    pub department: String,
    pub exported_at: DateTime<Utc>,
}

/// Acknowledge a report export after `delay`. Nothing is written.
pub async fn export(request: ExportRequest, delay: Duration) -> ExportReceipt {
    info!(format = ?request.format, range = ?request.range, department = %request.department, "Exporting report");
    tokio::time::sleep(delay).await;
    ExportReceipt {
        format: request.format,
        range: request.range,
        department: request.department,
        exported_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_adds_up() {
        assert_eq!(COMPLIANCE.iter().map(|c| c.percent).sum::<u32>(), 100);
        assert_eq!(COMPLIANCE.iter().map(|c| c.controls).sum::<u32>(), 200);
    }

    #[test]
    fn test_summary_status_tally() {
        assert_eq!(count_by_status(ItemStatus::Resolved), 2);
        assert_eq!(count_by_status(ItemStatus::InProgress), 2);
        assert_eq!(count_by_status(ItemStatus::Planned), 1);
    }

    #[test]
    fn test_export_request_defaults() {
        let req: ExportRequest = serde_json::from_str(r#"{"format":"pdf"}"#).unwrap();
        assert_eq!(req.range, ReportPeriod::Monthly);
        assert_eq!(req.department, "all");
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_waits_for_delay() {
        let started = tokio::time::Instant::now();
        let req = ExportRequest { format: ExportFormat::Png, range: ReportPeriod::Weekly, department: "finance".into() };
        let receipt = export(req, EXPORT_DELAY).await;
        assert!(started.elapsed() >= EXPORT_DELAY);
        assert_eq!(receipt.format, ExportFormat::Png);
    }
}
