//! Unified messaging system for session operations

use crate::queries::RenderProps;

// ANSI Color Codes for session messages
pub const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
pub const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
pub const COLOR_RESET: &str = "\x1b[0m";

/// Session-specific message types
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Normal session start/shutdown messages
    Info(String),
    /// Success messages for completed operations
    Success(String),
}

impl SessionMessage {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    /// Print the message with appropriate formatting
    pub fn print(&self) {
        match self {
            Self::Info(msg) => {
                println!("{}[INFO]{} {}", COLOR_INFO, COLOR_RESET, msg);
            }
            Self::Success(msg) => {
                println!("{}[SUCCESS]{} {}", COLOR_SUCCESS, COLOR_RESET, msg);
            }
        }
    }
}

pub fn print_session_starting(mode: &str, title: &str, query_count: usize) {
    SessionMessage::info(format!(
        "Starting {} of widget {:?} with {} queries",
        mode, title, query_count
    ))
    .print();
}

pub fn print_session_shutdown() {
    SessionMessage::info("Shutting down...").print();
}

pub fn print_session_exit_success() {
    SessionMessage::success("metrics-widgets exited successfully").print();
}

/// One line per series: name, point count and the latest value.
pub fn series_summary(props: &RenderProps) -> Vec<String> {
    let Some(series) = &props.time_series_results else {
        return Vec::new();
    };
    series
        .iter()
        .map(|s| match s.data.last() {
            Some(last) => format!(
                "{}: {} points, last {} = {}",
                s.series_name,
                s.data.len(),
                last.name,
                last.value
            ),
            None => format!("{}: no data", s.series_name),
        })
        .collect()
}

pub fn print_series_summary(props: &RenderProps) {
    for line in series_summary(props) {
        SessionMessage::info(line).print();
    }
}
