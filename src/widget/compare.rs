//! Change detection between two sets of widget props
//!
//! Only fields that change what gets fetched count. Identifiers, titles, layout
//! and sub-query names are presentation and never cause a refetch.

use super::selection::is_selection_equal;
use super::{Widget, WidgetProps, WidgetQuery};

/// What a props update requires of the orchestrator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropsChange {
    /// Something that affects the requests changed.
    Refetch,
    /// Only sub-query names changed; existing results can be relabelled.
    Relabel,
    Unchanged,
}

pub fn diff_props(prev: &WidgetProps, next: &WidgetProps) -> PropsChange {
    if prev.limit != next.limit
        || prev.organization.slug != next.organization.slug
        || !is_selection_equal(&prev.selection, &next.selection)
        || !is_fetch_equal(&prev.widget, &next.widget)
    {
        return PropsChange::Refetch;
    }

    if prev.widget.query_names() != next.widget.query_names() {
        return PropsChange::Relabel;
    }

    PropsChange::Unchanged
}

/// Compares the parts of a widget that end up in requests.
fn is_fetch_equal(a: &Widget, b: &Widget) -> bool {
    a.display_type == b.display_type
        && a.interval == b.interval
        && a.queries.len() == b.queries.len()
        && a
            .queries
            .iter()
            .zip(&b.queries)
            .all(|(qa, qb)| is_query_fetch_equal(qa, qb))
}

fn is_query_fetch_equal(a: &WidgetQuery, b: &WidgetQuery) -> bool {
    a.fields == b.fields
        && a.conditions == b.conditions
        && a.orderby == b.orderby
        && a.group_by == b.group_by
}
