//! Presentation context: chart panels, metric tiles and notices.
//!
//! The pipeline mutates a `Dashboard` passed in explicitly; renderers read it.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::aggregate::{breakdown_series, summarize, trend_series};
use crate::core::formatter::{format_money_tile, format_percent_tile, UNAVAILABLE};
use crate::core::models::report::CostReportBundle;
use crate::core::normalize::{forecast_amount, ri_utilization, savings_plans_utilization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPanel {
    pub title: &'static str,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartPanel {
    fn new(title: &'static str, kind: ChartKind) -> Self {
        Self {
            title,
            kind,
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn update(&mut self, labels: Vec<String>, values: Vec<f64>) {
        self.labels = labels;
        self.values = values;
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTiles {
    pub total_cost: String,
    pub forecasted_cost: String,
    pub ri_utilization: String,
    pub sp_utilization: String,
}

impl Default for MetricTiles {
    fn default() -> Self {
        Self {
            total_cost: UNAVAILABLE.to_string(),
            forecasted_cost: UNAVAILABLE.to_string(),
            ri_utilization: UNAVAILABLE.to_string(),
            sp_utilization: UNAVAILABLE.to_string(),
        }
    }
}

impl MetricTiles {
    pub fn from_bundle(bundle: &CostReportBundle, metric: &str) -> Self {
        let total = bundle
            .daily_costs
            .as_ref()
            .and_then(|report| summarize(report, metric).value());
        Self {
            total_cost: format_money_tile(total),
            forecasted_cost: format_money_tile(bundle.forecast.as_ref().and_then(forecast_amount)),
            ri_utilization: format_percent_tile(bundle.ri_utilization.as_ref().and_then(ri_utilization)),
            sp_utilization: format_percent_tile(
                bundle
                    .savings_plans
                    .as_ref()
                    .and_then(savings_plans_utilization),
            ),
        }
    }
}

/// A dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub tiles: MetricTiles,
    pub daily_cost: ChartPanel,
    pub service: ChartPanel,
    pub region: ChartPanel,
    pub refreshed_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            tiles: MetricTiles::default(),
            daily_cost: ChartPanel::new("Daily Cost Trend", ChartKind::Line),
            service: ChartPanel::new("Cost by Service", ChartKind::Doughnut),
            region: ChartPanel::new("Cost by Region", ChartKind::Bar),
            refreshed_at: None,
            notices: Vec::new(),
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update tiles and charts from a bundle.
    ///
    /// A category missing from the bundle leaves its chart untouched; its
    /// tile still falls back to the unavailable marker.
    pub fn apply(&mut self, bundle: &CostReportBundle, metric: &str) {
        self.tiles = MetricTiles::from_bundle(bundle, metric);

        if let Some(report) = &bundle.daily_costs {
            let series = trend_series(report, metric);
            if series.is_empty() {
                tracing::debug!("daily cost report has no usable periods");
            }
            let (labels, values) = series.into_parts();
            self.daily_cost.update(labels, values);
        }
        if let Some(report) = &bundle.service_costs {
            let (labels, values) = breakdown_series(report, metric).into_parts();
            self.service.update(labels, values);
        }
        if let Some(report) = &bundle.region_costs {
            let (labels, values) = breakdown_series(report, metric).into_parts();
            self.region.update(labels, values);
        }
    }

    pub fn mark_unavailable(&mut self) {
        self.tiles = MetricTiles::default();
    }

    pub fn mark_refreshed(&mut self, at: DateTime<Local>) {
        self.refreshed_at = Some(at);
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            message: message.into(),
        });
    }

    /// Drain pending notices. Taken notices are dismissed.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn charts(&self) -> [&ChartPanel; 3] {
        [&self.daily_cost, &self.service, &self.region]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::DEFAULT_METRIC;

    fn bundle(json: &str) -> CostReportBundle {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn apply_scenario_bundle() {
        let b = bundle(
            r#"{"dailyCosts":{"ResultsByTime":[{"TimePeriod":{"Start":"2025-07-16"},"Total":{"BlendedCost":{"Amount":"12.50"}}}]}}"#,
        );
        let mut dashboard = Dashboard::new();
        dashboard.apply(&b, DEFAULT_METRIC);

        assert_eq!(dashboard.tiles.total_cost, "$12.50");
        assert_eq!(dashboard.daily_cost.labels, vec!["Jul 16"]);
        assert_eq!(dashboard.daily_cost.values, vec![12.5]);
        assert_eq!(dashboard.tiles.forecasted_cost, "N/A");
        assert!(dashboard.service.is_empty());
    }

    #[test]
    fn zero_valid_periods_shows_unavailable_not_zero() {
        let b = bundle(
            r#"{"dailyCosts":{"ResultsByTime":[{"Total":{"BlendedCost":{"Amount":"bad"}}}]}}"#,
        );
        let mut dashboard = Dashboard::new();
        dashboard.apply(&b, DEFAULT_METRIC);
        assert_eq!(dashboard.tiles.total_cost, "N/A");

        let b = bundle(
            r#"{"dailyCosts":{"ResultsByTime":[{"Total":{"BlendedCost":{"Amount":"0"}}}]}}"#,
        );
        dashboard.apply(&b, DEFAULT_METRIC);
        assert_eq!(dashboard.tiles.total_cost, "$0.00");
    }

    #[test]
    fn apply_fills_every_tile_and_chart() {
        let b = bundle(
            r#"{
                "daily_costs": {"ResultsByTime":[{"TimePeriod":{"Start":"2025-07-15"},"Total":{"BlendedCost":{"Amount":"3"}}}]},
                "service_costs": {"ResultsByTime":[{"Groups":[
                    {"Keys":["Amazon EC2"],"Metrics":{"BlendedCost":{"Amount":"2"}}},
                    {"Keys":["Amazon S3"],"Metrics":{}}
                ]}]},
                "region_costs": {"ResultsByTime":[{"Groups":[
                    {"Keys":["us-east-1"],"Metrics":{"BlendedCost":{"Amount":"1.5"}}}
                ]}]},
                "forecast": {"Total":{"Amount":"99.999","Unit":"USD"}},
                "ri_utilization": {"Total":{"UtilizationPercentage":"87.54"}},
                "savings_plans": {"Total":{"Utilization":{"UtilizationPercentage":"50"}}}
            }"#,
        );
        let mut dashboard = Dashboard::new();
        dashboard.apply(&b, DEFAULT_METRIC);

        assert_eq!(
            dashboard.tiles,
            MetricTiles {
                total_cost: "$3.00".to_string(),
                forecasted_cost: "$100.00".to_string(),
                ri_utilization: "87.5%".to_string(),
                sp_utilization: "50.0%".to_string(),
            }
        );
        assert_eq!(dashboard.service.labels, vec!["Amazon EC2"]);
        assert_eq!(dashboard.region.values, vec![1.5]);
    }

    #[test]
    fn missing_category_keeps_previous_chart() {
        let mut dashboard = Dashboard::new();
        dashboard.region.update(vec!["eu-west-1".to_string()], vec![4.0]);
        dashboard.apply(&CostReportBundle::default(), DEFAULT_METRIC);
        assert_eq!(dashboard.region.labels, vec!["eu-west-1"]);
        assert_eq!(dashboard.tiles, MetricTiles::default());
    }

    #[test]
    fn notices_are_dismissed_once_taken() {
        let mut dashboard = Dashboard::new();
        dashboard.notify("first");
        assert_eq!(dashboard.take_notices().len(), 1);
        assert!(dashboard.take_notices().is_empty());
    }

    #[test]
    fn apply_twice_is_identical() {
        let b = bundle(
            r#"{"serviceCosts":{"ResultsByTime":[
                {"Groups":[{"Keys":["A"],"Metrics":{"BlendedCost":{"Amount":"0.1"}}}]},
                {"Groups":[{"Keys":["A"],"Metrics":{"BlendedCost":{"Amount":"0.2"}}}]}
            ]}}"#,
        );
        let mut first = Dashboard::new();
        first.apply(&b, DEFAULT_METRIC);
        let mut second = Dashboard::new();
        second.apply(&b, DEFAULT_METRIC);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
