//! Error classification for logging

use super::error::MetricsApiError;
use crate::logging::LogLevel;

/// Decides how loudly a failed metrics request is reported. Requests are never
/// retried; a failure is surfaced on the widget and logged at this level.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Classify error and determine appropriate log level
    pub fn classify_error(&self, error: &MetricsApiError) -> LogLevel {
        match error {
            // Rate limiting - low priority
            MetricsApiError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            MetricsApiError::Http { status, .. } if (500..=599).contains(status) => {
                LogLevel::Warn
            }

            // Authentication errors - critical
            MetricsApiError::Http { status, .. } if *status == 401 => LogLevel::Error,
            MetricsApiError::Http { status, .. } if *status == 403 => LogLevel::Error,

            // Malformed responses
            MetricsApiError::Decode(_) => LogLevel::Error,

            // Network issues and rejected queries
            _ => LogLevel::Warn,
        }
    }
}
