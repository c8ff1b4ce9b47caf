//! Metrics API Client
//!
//! A reqwest client for the organization metrics endpoint.

use crate::api::error::MetricsApiError;
use crate::api::{MetricsApi, MetricsRequest};
use crate::consts::cli_consts::http;
use crate::environment::Environment;
use crate::metrics::MetricsApiResponse;
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("metrics-widgets/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct MetricsClient {
    client: Client,
    environment: Environment,
    base_url: String,
}

impl MetricsClient {
    pub fn new(environment: Environment) -> Result<Self, MetricsApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(http::connect_timeout())
            .timeout(http::request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            environment,
            base_url: environment.api_url(),
        })
    }

    /// Points the client at a different API root, e.g. a self-hosted install.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn handle_response_status(response: Response) -> Result<Response, MetricsApiError> {
        if !response.status().is_success() {
            return Err(MetricsApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, MetricsApiError> {
        let url = self.build_url(endpoint);
        let response = self.client.get(&url).query(query).send().await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&response_bytes)?)
    }
}

#[async_trait::async_trait]
impl MetricsApi for MetricsClient {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn fetch_metrics(
        &self,
        request: &MetricsRequest,
    ) -> Result<MetricsApiResponse, MetricsApiError> {
        self.get_request(&request.endpoint(), &request.query_params())
            .await
    }
}
