use super::{MetricsApiResponse, MetricsGroup, Series, SeriesDataItem};

/// Expands one response into chart series, one per group and field.
///
/// Series are named after the sub-query. When a response holds more than one
/// group or more than one field, the group's tag values and the field are
/// appended so every series name stays distinct. Missing points plot as zero.
pub fn transform_metrics_response_to_series(
    data: &MetricsApiResponse,
    series_name: &str,
) -> Vec<Series> {
    let multiple_groups = data.groups.len() > 1;

    data.groups
        .iter()
        .flat_map(|group| {
            let multiple_fields = group.series.len() > 1;
            group.series.iter().map(move |(field, values)| Series {
                series_name: compound_name(
                    series_name,
                    multiple_groups.then(|| group_label(group)),
                    multiple_fields.then_some(field.as_str()),
                    field,
                ),
                data: data
                    .intervals
                    .iter()
                    .enumerate()
                    .map(|(index, interval)| SeriesDataItem {
                        name: interval.clone(),
                        value: values.get(index).copied().flatten().unwrap_or(0.0),
                    })
                    .collect(),
            })
        })
        .collect()
}

fn compound_name(base: &str, group: Option<String>, field: Option<&str>, fallback: &str) -> String {
    let base = if base.is_empty() { fallback } else { base };
    let mut parts = vec![base.to_string()];
    parts.extend(group);
    parts.extend(field.map(str::to_string));
    parts.join(" : ")
}

fn group_label(group: &MetricsGroup) -> String {
    group
        .by
        .values()
        .map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
