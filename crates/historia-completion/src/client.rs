use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::chat::{CompletionRequest, CompletionResponse};
use crate::error::CompletionError;

/// An opaque text-completion service.
///
/// Implementations return the normalized reply text (see
/// [`CompletionResponse::into_text`]).
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Calls the credential proxy over HTTP.
///
/// The proxy injects the model and the provider credential, so this client
/// carries no secrets.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompletionError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for ProxyClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        let parsed: CompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CompletionError::ResponseParse(format!("invalid response body: {e}")))?;
        let text = parsed.into_text()?;

        info!(reply_len = text.len(), "completion received");
        Ok(text)
    }
}
