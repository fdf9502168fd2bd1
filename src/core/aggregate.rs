//! Reduction of normalized facts into chart series and headline totals.

use crate::core::models::report::TimeSeriesReport;
use crate::core::models::series::AggregatedSeries;
use crate::core::normalize::{extract_amount, extract_group, period_label};

/// Shape of the reduction applied to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// One point per period, labelled by its start date, in report order.
    SinglePerPeriod,
    /// Running totals per first dimension key across all periods.
    GroupedPerPeriod,
}

/// Scalar total over a report plus the number of periods that contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub sum: f64,
    pub counted: usize,
}

impl PeriodTotals {
    /// `None` when no period carried a usable amount.
    pub fn value(&self) -> Option<f64> {
        (self.counted > 0).then_some(self.sum)
    }
}

pub fn aggregate_by_label(
    report: &TimeSeriesReport,
    metric: &str,
    reduction: Reduction,
) -> AggregatedSeries {
    let mut series = AggregatedSeries::new();
    match reduction {
        Reduction::SinglePerPeriod => {
            for period in &report.results_by_time {
                let (Some(label), Some(amount)) =
                    (period_label(period), extract_amount(period, metric))
                else {
                    continue;
                };
                series.push(label, amount);
            }
        }
        Reduction::GroupedPerPeriod => {
            for period in &report.results_by_time {
                for group in &period.groups {
                    if let Some((label, amount)) = extract_group(group, metric) {
                        series.accumulate(label, amount);
                    }
                }
            }
        }
    }
    series
}

/// Ordered `(labels, values)` for the daily trend line.
pub fn trend_series(report: &TimeSeriesReport, metric: &str) -> AggregatedSeries {
    aggregate_by_label(report, metric, Reduction::SinglePerPeriod)
}

/// Per-label totals for the service and region breakdowns.
pub fn breakdown_series(report: &TimeSeriesReport, metric: &str) -> AggregatedSeries {
    aggregate_by_label(report, metric, Reduction::GroupedPerPeriod)
}

pub fn summarize(report: &TimeSeriesReport, metric: &str) -> PeriodTotals {
    report
        .results_by_time
        .iter()
        .filter_map(|period| extract_amount(period, metric))
        .fold(PeriodTotals::default(), |acc, amount| PeriodTotals {
            sum: acc.sum + amount,
            counted: acc.counted + 1,
        })
}

/// Sum of every valid period total. Zero when nothing was usable.
pub fn sum_total(report: &TimeSeriesReport, metric: &str) -> f64 {
    summarize(report, metric).sum
}
