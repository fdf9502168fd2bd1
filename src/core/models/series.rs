use serde::Serialize;
use std::collections::HashMap;
#[cfg(test)]
use std::collections::BTreeMap;

/// Chart-ready `(labels, values)` pair.
///
/// Labels keep first-seen order. For the trend line this is the date axis;
/// for breakdowns the order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AggregatedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Append a point without merging into an existing label.
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        let label = label.into();
        self.index.entry(label.clone()).or_insert(self.labels.len());
        self.labels.push(label);
        self.values.push(value);
    }

    /// Add `value` to the running total for `label`, starting from 0 on first sight.
    pub fn accumulate(&mut self, label: &str, value: f64) {
        match self.index.get(label) {
            Some(&i) => self.values[i] += value,
            None => {
                self.index.insert(label.to_string(), self.labels.len());
                self.labels.push(label.to_string());
                self.values.push(value);
            }
        }
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<f64>) {
        (self.labels, self.values)
    }
}

#[cfg(test)]
impl AggregatedSeries {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.index.get(label).map(|&i| self.values[i])
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Order-free view of the series, for comparing breakdowns.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_keeps_first_seen_order() {
        let mut series = AggregatedSeries::new();
        series.accumulate("EC2", 1.0);
        series.accumulate("S3", 2.0);
        series.accumulate("EC2", 0.5);
        assert_eq!(series.labels, vec!["EC2", "S3"]);
        assert_eq!(series.values, vec![1.5, 2.0]);
        assert_eq!(series.get("EC2"), Some(1.5));
        assert_eq!(series.get("Lambda"), None);
    }

    #[test]
    fn push_allows_repeated_labels() {
        let mut series = AggregatedSeries::new();
        series.push("Jul 16", 1.0);
        series.push("Jul 16", 2.0);
        assert_eq!(series.labels.len(), 2);
        assert_eq!(series.get("Jul 16"), Some(1.0));
        assert!((series.total() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn to_map_ignores_insertion_order() {
        let mut a = AggregatedSeries::new();
        a.accumulate("x", 1.0);
        a.accumulate("y", 2.0);
        let mut b = AggregatedSeries::new();
        b.accumulate("y", 2.0);
        b.accumulate("x", 1.0);
        assert_ne!(a.labels, b.labels);
        assert_eq!(a.to_map(), b.to_map());
    }
}
