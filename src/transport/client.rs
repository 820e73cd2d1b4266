//! HTTP client side of the generate endpoint.

use crate::error::ApiError;
use crate::transport::decode::EventStream;
use crate::transport::wire::GenerateRequest;
use crate::transport::{SectionSource, SectionStream};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GENERATE_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Opens section streams against a running flowdoc server.
pub struct HttpSectionSource {
    client: Client,
    endpoint: String,
}

impl HttpSectionSource {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(GENERATE_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SectionSource for HttpSectionSource {
    async fn open(&self, request: &GenerateRequest) -> Result<SectionStream, ApiError> {
        debug!(endpoint = %self.endpoint, section = %request.section, "Opening section stream");
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::BackendUnavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ApiError::BackendUnavailable(format!(
                "status {}: {}",
                status, message
            )));
        }

        Ok(Box::pin(EventStream::new(Box::pin(response.bytes_stream()))))
    }

    fn source_name(&self) -> &str {
        "http"
    }
}
