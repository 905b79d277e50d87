//! SOC overview KPI cards.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Positive,
    Negative,
    Neutral,
}

impl ChangeType {
    pub fn css_class(&self) -> &'static str {
        match self {
            ChangeType::Positive => "text-success",
            ChangeType::Negative => "text-danger",
            ChangeType::Neutral  => "text-muted",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            ChangeType::Positive => "▲",
            ChangeType::Negative => "▼",
            ChangeType::Neutral  => "–",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    Critical,
    Warning,
    Success,
}

impl KpiStatus {
    pub fn css_class(&self) -> &'static str {
        match self {
            KpiStatus::Critical => "text-danger",
            KpiStatus::Warning  => "text-warning",
            KpiStatus::Success  => "text-success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: &'static str,
    pub change: &'static str,
    pub change_type: ChangeType,
    pub status: KpiStatus,
    pub sparkline: Vec<f64>,
}

impl KpiCard {
    pub fn sparkline_points(&self) -> String {
        sparkline_points(&self.sparkline)
    }
}

pub fn soc_kpis() -> Vec<KpiCard> {
    vec![
        KpiCard {
            title: "Active Threats",
            value: "247",
            change: "+12%",
            change_type: ChangeType::Negative,
            status: KpiStatus::Critical,
            sparkline: vec![45.0, 52.0, 48.0, 61.0, 55.0, 67.0, 59.0, 72.0, 68.0, 75.0, 71.0, 78.0],
        },
        KpiCard {
            title: "Resolved Incidents",
            value: "1,834",
            change: "+8%",
            change_type: ChangeType::Positive,
            status: KpiStatus::Success,
            sparkline: vec![
                120.0, 135.0, 142.0, 138.0, 155.0, 148.0, 162.0, 159.0, 171.0, 168.0, 175.0, 182.0,
            ],
        },
        KpiCard {
            title: "Vulnerability Score",
            value: "7.2/10",
            change: "-0.3",
            change_type: ChangeType::Positive,
            status: KpiStatus::Warning,
            sparkline: vec![8.1, 7.9, 8.2, 7.8, 7.6, 7.4, 7.7, 7.5, 7.3, 7.1, 7.0, 7.2],
        },
        KpiCard {
            title: "System Health",
            value: "98.7%",
            change: "+0.2%",
            change_type: ChangeType::Positive,
            status: KpiStatus::Success,
            sparkline: vec![97.2, 97.8, 98.1, 97.9, 98.3, 98.0, 98.5, 98.2, 98.7, 98.4, 98.6, 98.7],
        },
    ]
}

/// Threat-intelligence metrics strip. These cards carry no sparkline.
pub fn threat_metrics() -> Vec<KpiCard> {
    let card = |title, value, change, change_type, status| KpiCard {
        title,
        value,
        change,
        change_type,
        status,
        sparkline: Vec::new(),
    };
    vec![
        card("Threat Detection Rate", "94.7%", "+2.3%", ChangeType::Positive, KpiStatus::Success),
        card("Mean Time to Resolution", "4.2h", "-18min", ChangeType::Positive, KpiStatus::Success),
        card("False Positive Ratio", "3.1%", "-0.8%", ChangeType::Positive, KpiStatus::Warning),
        card("Active Attack Vectors", "127", "+12", ChangeType::Negative, KpiStatus::Critical),
    ]
}

/// SVG polyline `points` for a 64x32 sparkline box.
pub fn sparkline_points(values: &[f64]) -> String {
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let last = values.len().saturating_sub(1);

    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = if last == 0 { 0.0 } else { i as f64 / last as f64 * 60.0 };
            let y = if max > 0.0 { 32.0 - v / max * 28.0 } else { 32.0 };
            format!("{},{}", trim(x), trim(y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_four_cards_with_twelve_points() {
        let cards = soc_kpis();
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.sparkline.len() == 12));
        assert_eq!(cards[0].title, "Active Threats");
        assert_eq!(cards[0].change_type, ChangeType::Negative);
    }

    #[test]
    fn test_threat_metrics_have_no_sparkline() {
        let cards = threat_metrics();
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.sparkline_points().is_empty()));
    }

    #[test]
    fn test_sparkline_scaling() {
        assert_eq!(sparkline_points(&[0.0, 50.0, 100.0]), "0,32 30,18 60,4");
    }

    #[test]
    fn test_sparkline_single_point() {
        assert_eq!(sparkline_points(&[5.0]), "0,4");
    }

    #[test]
    fn test_sparkline_all_zero() {
        assert_eq!(sparkline_points(&[0.0, 0.0]), "0,32 60,32");
    }

    #[test]
    fn test_sparkline_empty() {
        assert_eq!(sparkline_points(&[]), "");
    }
}
