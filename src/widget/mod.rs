//! Dashboard widget definitions
//!
//! A widget is a display mode plus an ordered list of sub-queries. Widgets are
//! read from the JSON the dashboard API produces (camelCase keys).

pub mod compare;
pub mod interval;
pub mod selection;

pub use compare::{PropsChange, diff_props};
pub use selection::{DateTimeSelection, PageFilters, SelectionError};

use serde::{Deserialize, Serialize};

/// How a widget presents its results.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisplayType {
    Line,
    Area,
    StackedArea,
    Bar,
    Table,
    WorldMap,
    BigNumber,
    TopN,
}

impl DisplayType {
    /// Table and big number widgets take the tabular path.
    pub fn is_tabular(self) -> bool {
        matches!(self, DisplayType::Table | DisplayType::BigNumber)
    }

    /// The metrics backend has no geographic breakdown.
    pub fn is_supported_by_metrics(self) -> bool {
        self != DisplayType::WorldMap
    }
}

/// One named sub-query of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetQuery {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub orderby: Option<String>,
    /// Reserved; not sent to the backend yet.
    #[serde(default)]
    pub group_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayout {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub min_h: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub temp_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub display_type: DisplayType,
    #[serde(default)]
    pub interval: Option<String>,
    pub queries: Vec<WidgetQuery>,
    #[serde(default)]
    pub layout: Option<WidgetLayout>,
    #[serde(default)]
    pub widget_type: Option<String>,
}

impl Widget {
    pub fn query_names(&self) -> Vec<&str> {
        self.queries.iter().map(|q| q.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub slug: String,
}

impl Organization {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

/// Everything a widget's query orchestrator is given from the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProps {
    pub organization: Organization,
    pub selection: PageFilters,
    pub widget: Widget,
    pub limit: Option<u32>,
}
