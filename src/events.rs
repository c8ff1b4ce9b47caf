//! Event System
//!
//! Render updates of a widget, as shown on the console.

use crate::logging::{LogLevel, should_log_with_env};
use crate::queries::RenderProps;
use chrono::Local;
use std::fmt::Display;
use tokio::sync::mpsc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Loading,
    Success,
    Error,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub widget: String,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    fn new(widget: &str, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            widget: widget.to_string(),
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    /// Summarizes one render of a widget.
    pub fn from_render(widget: &str, props: &RenderProps) -> Self {
        let series_count = props.time_series_results.as_ref().map_or(0, Vec::len);

        if let Some(error) = &props.error_message {
            let msg = if props.loading {
                format!("{} (still loading, {} series so far)", error, series_count)
            } else {
                format!("{} ({} series loaded)", error, series_count)
            };
            return Self::new(widget, msg, EventType::Error, LogLevel::Warn);
        }

        if props.loading {
            return Self::new(
                widget,
                format!("Fetching... {} series so far", series_count),
                EventType::Loading,
                LogLevel::Debug,
            );
        }

        let msg = match &props.table_results {
            Some(tables) => format!("{} tables ready", tables.len()),
            None => format!("{} series ready", series_count),
        };
        Self::new(widget, msg, EventType::Success, LogLevel::Info)
    }

    /// Marks a props change picked up by watch mode.
    pub fn refresh(widget: &str, msg: String) -> Self {
        Self::new(widget, msg, EventType::Refresh, LogLevel::Info)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.event_type, self.timestamp, self.widget, self.msg
        )
    }
}

/// Forwards events to the console printer.
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::UnboundedSender<Event>) -> Self {
        Self { sender }
    }

    /// Never blocks, so it can be called from a render callback.
    pub fn send_event(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
