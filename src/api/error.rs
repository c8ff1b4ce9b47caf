//! Error handling for the metrics API module

use crate::consts::cli_consts::messages::UNKNOWN_ERROR;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsApiError {
    /// Failed to decode a JSON body from the server
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },
}

impl MetricsApiError {
    pub async fn from_response(response: reqwest::Response) -> MetricsApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        MetricsApiError::Http { status, message }
    }

    /// The `detail` string of a JSON error body, if there is a non-empty one.
    pub fn detail(&self) -> Option<String> {
        let MetricsApiError::Http { message, .. } = self else {
            return None;
        };
        let body: serde_json::Value = serde_json::from_str(message).ok()?;
        body.get("detail")?
            .as_str()
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .map(str::to_string)
    }

    /// Text shown to the user in place of the widget's results.
    pub fn user_message(&self) -> String {
        self.detail().unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}
