//! Generic `generateText` gateway
//!
//! The secondary provider: one POST with `{prompt, model, maxTokens, search}`
//! answered by `{text}`. The model is fixed by configuration.

use super::{FetchRequest, GenerationParams, HttpFetcher, ProviderError, TextGenerator};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PROVIDER: &str = "Gateway";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest<'a> {
    prompt: String,
    model: &'a str,
    max_tokens: u32,
    search: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateTextResponse {
    text: String,
}

pub struct GatewayProvider {
    fetcher: Arc<dyn HttpFetcher>,
    url: String,
    model: String,
    authorized: bool,
    timeout: Duration,
}

impl GatewayProvider {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, config: &GatewayConfig) -> Self {
        Self {
            fetcher,
            url: config.url.clone(),
            model: config.model.clone(),
            authorized: config.api_key.is_some(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GatewayProvider {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, ProviderError> {
        let body = serde_json::to_value(GenerateTextRequest {
            prompt: params.flattened_prompt(),
            model: &self.model,
            max_tokens: params.max_tokens,
            search: params.search,
        })
        .map_err(|e| ProviderError::Transport(format!("Failed to encode request: {}", e)))?;

        let mut request = FetchRequest::post(self.url.clone(), body).timeout(self.timeout);
        if self.authorized {
            request = request.header("Authorization", "Bearer {{GATEWAY_API_KEY}}");
        }

        let started = Instant::now();
        let response = self.fetcher.fetch(request).await?;
        tracing::debug!(
            "Gateway {} answered {} in {:?}",
            self.model,
            response.status,
            started.elapsed()
        );

        if !(200..300).contains(&response.status) {
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        let parsed: GenerateTextResponse =
            serde_json::from_value(response.body).map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;
        Ok(parsed.text)
    }
}
