//! Safe extraction of numeric facts from loosely shaped cost reports.
//!
//! Every function here returns `None` instead of failing when any level of
//! the nesting is missing or malformed. Callers treat `None` as "contributes
//! nothing" and do not count the record.

use chrono::NaiveDate;

use crate::core::models::report::{
    ForecastReport, GroupedAmount, Period, RiUtilizationReport, SavingsPlansReport,
};

/// Cost metric read when none is configured.
pub const DEFAULT_METRIC: &str = "BlendedCost";

/// Display format for period-start labels on the trend axis.
pub const PERIOD_LABEL_FORMAT: &str = "%b %d";

/// Parsed aggregate amount of a period for `metric`.
pub fn extract_amount(period: &Period, metric: &str) -> Option<f64> {
    let value = period.total.get(metric)?;
    let amount = value.amount.value();
    if amount.is_none() {
        tracing::debug!(
            metric,
            raw = value.amount.raw().unwrap_or("<missing>"),
            "period total is not a number"
        );
    }
    amount
}

/// Label (first dimension key) and parsed amount of a group for `metric`.
pub fn extract_group<'a>(group: &'a GroupedAmount, metric: &str) -> Option<(&'a str, f64)> {
    let label = group
        .keys
        .first()
        .and_then(|key| key.as_deref())
        .filter(|key| !key.trim().is_empty());
    let Some(label) = label else {
        tracing::debug!("skipping group without a dimension key");
        return None;
    };
    let Some(amount) = group.metrics.get(metric).and_then(|m| m.amount.value()) else {
        tracing::debug!(label, metric, "skipping group without a usable amount");
        return None;
    };
    Some((label, amount))
}

/// Start date of a period. Accepts a plain date or a timestamp with a date prefix.
pub fn period_start(period: &Period) -> Option<NaiveDate> {
    let start = period.time_period.as_ref()?.start.as_deref()?.trim();
    let date_part = start.get(..10).unwrap_or(start);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(start, "period start is not a date");
            None
        }
    }
}

/// Trend-axis label for a period, e.g. `Jul 16`.
pub fn period_label(period: &Period) -> Option<String> {
    period_start(period).map(|date| date.format(PERIOD_LABEL_FORMAT).to_string())
}

pub fn forecast_amount(report: &ForecastReport) -> Option<f64> {
    report.total.as_ref()?.amount.value()
}

pub fn ri_utilization(report: &RiUtilizationReport) -> Option<f64> {
    report.total.as_ref()?.utilization_percentage.value()
}

pub fn savings_plans_utilization(report: &SavingsPlansReport) -> Option<f64> {
    report
        .total
        .as_ref()?
        .utilization
        .as_ref()?
        .utilization_percentage
        .value()
}
