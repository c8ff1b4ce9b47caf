use crate::api::error::MetricsApiError;
use crate::environment::Environment;
use crate::metrics::MetricsApiResponse;

pub(crate) mod client;
pub use client::MetricsClient;
pub mod error;
pub mod error_handler;
pub mod request;
pub use request::MetricsRequest;

#[cfg(test)]
use mockall::{automock, predicate::*};

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MetricsApi: Send + Sync {
    fn environment(&self) -> &Environment;

    /// Fetch the time series for one sub-query.
    async fn fetch_metrics(
        &self,
        request: &MetricsRequest,
    ) -> Result<MetricsApiResponse, MetricsApiError>;
}
