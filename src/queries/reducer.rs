//! State transitions
//!
//! Every change to [`DerivedState`] goes through [`reduce`]. Actions tagged
//! with a generation are ignored unless it matches the state's current one.

use super::state::{DerivedState, Generation, SeriesSlots};
use crate::metrics::{MetricsApiResponse, Series, transform_metrics_response_to_series};

#[derive(Debug, Clone)]
pub enum Action {
    /// The display mode can't be served; nothing will be fetched.
    Unsupported {
        generation: Generation,
        message: String,
    },
    /// A new cycle starts. Clears all results and any error.
    BeginCycle { generation: Generation },
    TabularLoaded { generation: Generation },
    TimeSeriesStarted {
        generation: Generation,
        total: usize,
    },
    QuerySucceeded {
        generation: Generation,
        index: usize,
        series: Vec<Series>,
        raw: MetricsApiResponse,
    },
    QueryFailed {
        generation: Generation,
        message: String,
    },
    QuerySettled {
        generation: Generation,
        completed: usize,
        total: usize,
    },
    /// Rebuild series from stored responses under new sub-query names.
    Relabel { names: Vec<String> },
}

impl Action {
    fn generation(&self) -> Option<Generation> {
        match self {
            Action::Unsupported { .. } | Action::BeginCycle { .. } | Action::Relabel { .. } => None,
            Action::TabularLoaded { generation }
            | Action::TimeSeriesStarted { generation, .. }
            | Action::QuerySucceeded { generation, .. }
            | Action::QueryFailed { generation, .. }
            | Action::QuerySettled { generation, .. } => Some(*generation),
        }
    }
}

pub fn reduce(state: &DerivedState, action: Action) -> DerivedState {
    if let Some(generation) = action.generation() {
        if state.query_fetch_id != Some(generation) {
            // a different fetch was started after this one
            return state.clone();
        }
    }

    match action {
        Action::Unsupported {
            generation,
            message,
        } => DerivedState {
            loading: false,
            error_message: Some(message),
            query_fetch_id: Some(generation),
            ..DerivedState::default()
        },
        Action::BeginCycle { generation } => DerivedState {
            loading: true,
            query_fetch_id: Some(generation),
            ..DerivedState::default()
        },
        Action::TabularLoaded { .. } => DerivedState {
            loading: false,
            table_results: Some(Vec::new()),
            ..state.clone()
        },
        Action::TimeSeriesStarted { total, .. } => DerivedState {
            loading: total > 0,
            raw_results: Some(vec![None; total]),
            time_series_results: Some(SeriesSlots::default()),
            ..state.clone()
        },
        Action::QuerySucceeded {
            index, series, raw, ..
        } => {
            let mut time_series = state.time_series_results.clone().unwrap_or_default();
            time_series.place_query_series(index, series);

            let mut raw_results = state.raw_results.clone().unwrap_or_default();
            if raw_results.len() <= index {
                raw_results.resize(index + 1, None);
            }
            raw_results[index] = Some(raw);

            DerivedState {
                time_series_results: Some(time_series),
                raw_results: Some(raw_results),
                ..state.clone()
            }
        }
        Action::QueryFailed { message, .. } => DerivedState {
            // the first failure of a cycle is the one shown
            error_message: state.error_message.clone().or(Some(message)),
            ..state.clone()
        },
        Action::QuerySettled {
            completed, total, ..
        } => DerivedState {
            loading: completed < total,
            ..state.clone()
        },
        Action::Relabel { names } => {
            let Some(raw_results) = &state.raw_results else {
                return state.clone();
            };
            let mut time_series = SeriesSlots::default();
            for (index, raw) in raw_results.iter().enumerate() {
                let (Some(raw), Some(name)) = (raw, names.get(index)) else {
                    continue;
                };
                time_series.place_query_series(index, transform_metrics_response_to_series(raw, name));
            }
            DerivedState {
                time_series_results: Some(time_series),
                ..state.clone()
            }
        }
    }
}
