//! Metrics API payloads and the chart series derived from them.

pub mod transform;

pub use transform::transform_metrics_response_to_series;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a `metrics/data/` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsApiResponse {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub intervals: Vec<String>,
    #[serde(default)]
    pub groups: Vec<MetricsGroup>,
}

/// One group of a response: the values of the group-by tags plus per-field
/// totals and per-interval series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsGroup {
    #[serde(default)]
    pub by: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub totals: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDataItem {
    /// Interval start
    pub name: String,
    pub value: f64,
}

/// A named line on a time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub series_name: String,
    pub data: Vec<SeriesDataItem>,
}

/// Tabular widget output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDataWithTitle {
    pub title: String,
    pub data: Vec<BTreeMap<String, serde_json::Value>>,
}
