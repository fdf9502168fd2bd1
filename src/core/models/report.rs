//! Cost report payloads as delivered by the billing API.
//!
//! Every nested field is optional and deserialized leniently: a value of the
//! wrong JSON type becomes `None` (or an empty collection) instead of failing
//! the whole document. Extraction of numbers happens later in `normalize`.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Full multi-category payload for one refresh cycle.
///
/// Keys are accepted in camelCase (`dailyCosts`) and snake_case
/// (`daily_costs`). When a body carries both, the camelCase entry wins.
#[derive(Debug, Clone, Default)]
pub struct CostReportBundle {
    pub daily_costs: Option<TimeSeriesReport>,
    pub service_costs: Option<TimeSeriesReport>,
    pub region_costs: Option<TimeSeriesReport>,
    pub forecast: Option<ForecastReport>,
    pub ri_utilization: Option<RiUtilizationReport>,
    pub savings_plans: Option<SavingsPlansReport>,
}

impl<'de> Deserialize<'de> for CostReportBundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            daily_costs: take_entry(&mut entries, &["dailyCosts", "daily_costs"]),
            service_costs: take_entry(&mut entries, &["serviceCosts", "service_costs"]),
            region_costs: take_entry(&mut entries, &["regionCosts", "region_costs"]),
            forecast: take_entry(&mut entries, &["forecast"]),
            ri_utilization: take_entry(&mut entries, &["riUtilization", "ri_utilization"]),
            savings_plans: take_entry(&mut entries, &["savingsPlans", "savings_plans"]),
        })
    }
}

/// First non-null entry among `keys`, converted leniently.
fn take_entry<T: DeserializeOwned>(entries: &mut Map<String, Value>, keys: &[&str]) -> Option<T> {
    let value = keys
        .iter()
        .filter_map(|key| entries.remove(*key))
        .find(|value| !value.is_null())?;
    convert(value)
}

impl CostReportBundle {
    /// True when no category resolved to a report.
    pub fn is_empty(&self) -> bool {
        self.daily_costs.is_none()
            && self.service_costs.is_none()
            && self.region_costs.is_none()
            && self.forecast.is_none()
            && self.ri_utilization.is_none()
            && self.savings_plans.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesReport {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub results_by_time: Vec<Period>,
}

/// One time bucket of a report (usually a day or a month).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Period {
    #[serde(default, deserialize_with = "lenient")]
    pub time_period: Option<TimePeriod>,
    /// Aggregate totals keyed by metric name, e.g. `BlendedCost`.
    #[serde(default, deserialize_with = "lenient_map")]
    pub total: HashMap<String, MetricValue>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub groups: Vec<GroupedAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    #[serde(default, deserialize_with = "lenient")]
    pub start: Option<String>,
}

/// A dimension-keyed sub-total within a period.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupedAmount {
    /// Dimension values; non-string elements are held as `None`.
    #[serde(default, deserialize_with = "lenient_keys")]
    pub keys: Vec<Option<String>>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub metrics: HashMap<String, MetricValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    #[serde(default)]
    pub amount: MoneyAmount,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForecastReport {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<MetricValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiUtilizationReport {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<UtilizationTotal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavingsPlansReport {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<SavingsPlansTotal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavingsPlansTotal {
    #[serde(default, deserialize_with = "lenient")]
    pub utilization: Option<UtilizationTotal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UtilizationTotal {
    #[serde(default)]
    pub utilization_percentage: NumericString,
}

/// A decimal number transported as a string (`"12.50"`).
///
/// Bare JSON numbers are tolerated; anything else is held as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericString(Option<String>);

pub type MoneyAmount = NumericString;

impl NumericString {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Parsed value, or `None` for missing, empty, non-numeric or non-finite input.
    pub fn value(&self) -> Option<f64> {
        let raw = self.0.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl<'de> Deserialize<'de> for NumericString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Self::new(s),
            Some(Value::Number(n)) => Self::new(n.to_string()),
            _ => Self(None),
        })
    }
}

fn convert<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed report field");
            None
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(convert))
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(convert)
            .collect()),
        Some(other) if !other.is_null() => {
            tracing::debug!(kind = json_kind(&other), "expected an array in cost report");
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

fn lenient_map<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => Ok(entries
            .into_iter()
            .filter_map(|(k, v)| convert(v).map(|v| (k, v)))
            .collect()),
        Some(other) if !other.is_null() => {
            tracing::debug!(kind = json_kind(&other), "expected an object in cost report");
            Ok(HashMap::new())
        }
        _ => Ok(HashMap::new()),
    }
}

fn lenient_keys<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
