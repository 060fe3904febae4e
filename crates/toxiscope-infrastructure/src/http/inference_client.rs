//! Client for the stateless text-analysis service.

use super::envelope::ApiEnvelope;
use super::transport::{Bearer, HttpTransport, UnauthorizedPolicy, join_url};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use toxiscope_core::BackendError;
use toxiscope_core::analysis::{AnalysisResult, InferenceBackend};

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

/// `GET /health` body.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct RestInferenceClient {
    transport: HttpTransport,
    base_url: String,
}

impl RestInferenceClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        let url = join_url(&self.base_url, "/health");
        let request = self.transport.request(Method::GET, &url, Bearer::None);
        self.transport.execute_json(request, UnauthorizedPolicy::Report).await
    }
}

#[async_trait]
impl InferenceBackend for RestInferenceClient {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, BackendError> {
        let url = join_url(&self.base_url, "/analyze");
        tracing::debug!(chars = text.chars().count(), "Requesting analysis");

        let request = self
            .transport
            .request(Method::POST, &url, Bearer::Stored)
            .json(&AnalyzeRequest { text });
        let envelope: ApiEnvelope<AnalysisResult> = self
            .transport
            .execute_json(request, UnauthorizedPolicy::Notify)
            .await?;

        Ok(envelope.into_result()?.normalized())
    }
}
