//! Metrics request parameters

use crate::consts::cli_consts::widgets::TOP_N;
use crate::widget::interval::get_widget_interval;
use crate::widget::{DateTimeSelection, DisplayType, WidgetProps, WidgetQuery};

/// Everything sent for one sub-query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    pub field: Vec<String>,
    pub org_slug: String,
    pub environment: Vec<String>,
    pub project: Vec<i64>,
    pub datetime: DateTimeSelection,
    pub interval: String,
    pub limit: Option<u32>,
    pub order_by: Option<String>,
    pub query: String,
}

impl MetricsRequest {
    /// Builds the request for one sub-query of a widget.
    ///
    /// The limit only applies to top-N widgets, which fall back to [`TOP_N`].
    pub fn for_query(props: &WidgetProps, query: &WidgetQuery, interval: &str) -> Self {
        let limit = match props.widget.display_type {
            DisplayType::TopN => Some(props.limit.unwrap_or(TOP_N)),
            _ => None,
        };

        Self {
            field: query.fields.clone(),
            org_slug: props.organization.slug.clone(),
            environment: props.selection.environments.clone(),
            project: props.selection.projects.clone(),
            datetime: props.selection.datetime.clone(),
            interval: interval.to_string(),
            limit,
            order_by: query.orderby.clone(),
            query: query.conditions.clone(),
        }
    }

    /// One request per sub-query, in sub-query order.
    pub fn for_widget(props: &WidgetProps) -> Vec<Self> {
        let interval = get_widget_interval(&props.widget, &props.selection.datetime);
        props
            .widget
            .queries
            .iter()
            .map(|query| Self::for_query(props, query, &interval))
            .collect()
    }

    pub fn endpoint(&self) -> String {
        format!(
            "organizations/{}/metrics/data/",
            urlencoding::encode(&self.org_slug)
        )
    }

    /// Query string pairs. List parameters repeat their key and empty values
    /// are left out.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        params.extend(self.field.iter().map(|f| ("field", f.clone())));
        params.extend(self.environment.iter().map(|e| ("environment", e.clone())));
        params.extend(self.project.iter().map(|p| ("project", p.to_string())));
        params.push(("interval", self.interval.clone()));
        params.extend(self.datetime.query_params());
        if let Some(limit) = self.limit {
            params.push(("per_page", limit.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("orderBy", order_by.clone()));
        }
        params.push(("query", self.query.clone()));

        params.retain(|(_, value)| !value.is_empty());
        params
    }
}
