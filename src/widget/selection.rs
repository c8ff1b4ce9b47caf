//! Page filters: the environments, projects and time window a widget is scoped to.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("either a start/end pair or a period must be set, not both")]
    Ambiguous,

    #[error("no time window: set a start/end pair or a period")]
    Missing,

    #[error("start and end must be set together")]
    Incomplete,

    #[error("end ({end}) is before start ({start})")]
    Inverted { start: String, end: String },
}

/// The time window of a selection. Exactly one form is ever set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateTime", into = "RawDateTime")]
pub enum DateTimeSelection {
    Absolute {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Relative {
        period: String,
    },
}

impl DateTimeSelection {
    pub fn relative(period: impl Into<String>) -> Self {
        Self::Relative {
            period: period.into(),
        }
    }

    /// Builds a selection from optional parts, enforcing the exactly-one rule.
    pub fn from_parts(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        period: Option<String>,
    ) -> Result<Self, SelectionError> {
        RawDateTime { start, end, period }.try_into()
    }

    /// Request parameter pairs for this window.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Absolute { start, end } => vec![
                ("start", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ],
            Self::Relative { period } => vec![("statsPeriod", period.clone())],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<String>,
}

impl TryFrom<RawDateTime> for DateTimeSelection {
    type Error = SelectionError;

    fn try_from(raw: RawDateTime) -> Result<Self, Self::Error> {
        let period = raw.period.filter(|p| !p.is_empty());
        match (raw.start, raw.end, period) {
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => Err(SelectionError::Ambiguous),
            (None, None, None) => Err(SelectionError::Missing),
            (None, None, Some(period)) => Ok(Self::Relative { period }),
            (Some(start), Some(end), None) => {
                if end < start {
                    return Err(SelectionError::Inverted {
                        start: start.to_rfc3339(),
                        end: end.to_rfc3339(),
                    });
                }
                Ok(Self::Absolute { start, end })
            }
            _ => Err(SelectionError::Incomplete),
        }
    }
}

impl From<DateTimeSelection> for RawDateTime {
    fn from(selection: DateTimeSelection) -> Self {
        match selection {
            DateTimeSelection::Absolute { start, end } => RawDateTime {
                start: Some(start),
                end: Some(end),
                period: None,
            },
            DateTimeSelection::Relative { period } => RawDateTime {
                period: Some(period),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilters {
    #[serde(default)]
    pub projects: Vec<i64>,
    #[serde(default)]
    pub environments: Vec<String>,
    pub datetime: DateTimeSelection,
}

/// Two selections are equal when they cover the same projects and environments
/// (in any order) over the same time window.
pub fn is_selection_equal(a: &PageFilters, b: &PageFilters) -> bool {
    a.projects.iter().collect::<BTreeSet<_>>() == b.projects.iter().collect::<BTreeSet<_>>()
        && a.environments.iter().collect::<BTreeSet<_>>()
            == b.environments.iter().collect::<BTreeSet<_>>()
        && a.datetime == b.datetime
}
