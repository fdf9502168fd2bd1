use chrono::Local;

use crate::core::aggregate::sum_total;
use crate::core::dashboard::Dashboard;
use crate::core::fetch::Fetcher;

pub const NO_DATA_MESSAGE: &str =
    "No cost data available. Check that the cost API is running or that report files exist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Rendered,
    NoData,
}

/// Run one fetch → normalize → aggregate cycle into `dashboard`.
pub async fn refresh(fetcher: &Fetcher, dashboard: &mut Dashboard, metric: &str) -> RefreshOutcome {
    let outcome = match fetcher.fetch_bundle().await {
        Some(bundle) => {
            if let Some(daily) = &bundle.daily_costs {
                tracing::debug!(total = sum_total(daily, metric), metric, "daily cost total");
            }
            dashboard.apply(&bundle, metric);
            tracing::debug!(
                trend_points = dashboard.daily_cost.labels.len(),
                services = dashboard.service.labels.len(),
                regions = dashboard.region.labels.len(),
                "dashboard updated"
            );
            RefreshOutcome::Rendered
        }
        None => {
            tracing::warn!("no cost data available");
            dashboard.mark_unavailable();
            dashboard.notify(NO_DATA_MESSAGE);
            RefreshOutcome::NoData
        }
    };
    dashboard.mark_refreshed(Local::now());
    outcome
}
