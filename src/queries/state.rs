//! Widget query state
//!
//! The state an orchestrator owns and the read-only view handed to renderers.

use crate::metrics::{MetricsApiResponse, Series, TableDataWithTitle};
use std::fmt::{Display, Formatter};

/// Identifies one fetch cycle. Completions carrying an older generation are
/// discarded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub(crate) fn first() -> Self {
        Generation(1)
    }

    pub(crate) fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Chart series addressed by position.
///
/// Slot `i` keeps its series across refetches so a renderer that colors series
/// by index stays consistent. Slots not yet filled are skipped when reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSlots(Vec<Option<Series>>);

impl SeriesSlots {
    pub fn place(&mut self, slot: usize, series: Series) {
        if self.0.len() <= slot {
            self.0.resize(slot + 1, None);
        }
        self.0[slot] = Some(series);
    }

    /// Writes the series of sub-query `index` at `index * series.len() + i`.
    ///
    /// Sub-queries returning different numbers of series share slots, so a
    /// narrower response can overwrite a wider neighbour's trailing series.
    pub fn place_query_series(&mut self, index: usize, series: Vec<Series>) {
        let width = series.len();
        for (offset, s) in series.into_iter().enumerate() {
            self.place(index * width + offset, s);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.0.iter().flatten()
    }

    pub fn to_vec(&self) -> Vec<Series> {
        self.iter().cloned().collect()
    }
}

/// Everything the orchestrator knows about the current fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedState {
    pub loading: bool,
    pub error_message: Option<String>,
    pub query_fetch_id: Option<Generation>,
    /// One slot per sub-query, filled as requests complete.
    pub raw_results: Option<Vec<Option<MetricsApiResponse>>>,
    pub table_results: Option<Vec<TableDataWithTitle>>,
    pub time_series_results: Option<SeriesSlots>,
}

impl Default for DerivedState {
    fn default() -> Self {
        Self {
            loading: true,
            error_message: None,
            query_fetch_id: None,
            raw_results: None,
            table_results: None,
            time_series_results: None,
        }
    }
}

impl DerivedState {
    /// True when there is one raw-result slot per sub-query. Slots of failed
    /// sub-queries stay empty.
    pub fn has_raw_result_slots(&self, query_count: usize) -> bool {
        self.raw_results
            .as_ref()
            .is_some_and(|raw| raw.len() == query_count)
    }
}

/// The slice of state handed to the render callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProps {
    pub loading: bool,
    pub time_series_results: Option<Vec<Series>>,
    pub table_results: Option<Vec<TableDataWithTitle>>,
    pub error_message: Option<String>,
}

impl From<&DerivedState> for RenderProps {
    fn from(state: &DerivedState) -> Self {
        Self {
            loading: state.loading,
            time_series_results: state.time_series_results.as_ref().map(SeriesSlots::to_vec),
            table_results: state.table_results.clone(),
            error_message: state.error_message.clone(),
        }
    }
}
