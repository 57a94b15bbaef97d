//! OpenRouter chat-completions provider

use super::{FetchRequest, GenerationParams, HttpFetcher, ProviderError, TextGenerator};
use crate::catalog::Catalog;
use crate::config::OpenRouterConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PROVIDER: &str = "OpenRouter";

/// Nucleus sampling value sent with every request
const TOP_P: f32 = 0.9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

pub struct OpenRouterProvider {
    fetcher: Arc<dyn HttpFetcher>,
    catalog: Arc<Catalog>,
    base_url: String,
    referer: String,
    title: String,
    timeout: Duration,
}

impl OpenRouterProvider {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, catalog: Arc<Catalog>, config: &OpenRouterConfig) -> Self {
        Self {
            fetcher,
            catalog,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn build_request(&self, model: &str, params: &GenerationParams) -> Result<FetchRequest, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &params.system_prompt {
            messages.push(Message {
                role: MessageRole::System,
                content: system.clone(),
            });
        }
        messages.push(Message {
            role: MessageRole::User,
            content: params.prompt.clone(),
        });

        let body = serde_json::to_value(ChatRequest {
            model,
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: TOP_P,
        })
        .map_err(|e| ProviderError::Transport(format!("Failed to encode request: {}", e)))?;

        Ok(
            FetchRequest::post(format!("{}/chat/completions", self.base_url), body)
                .header("Authorization", "Bearer {{OPENROUTER_API_KEY}}")
                .header("Content-Type", "application/json")
                .header("HTTP-Referer", self.referer.clone())
                .header("X-Title", self.title.clone())
                .timeout(self.timeout),
        )
    }
}

#[async_trait]
impl TextGenerator for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, ProviderError> {
        let requested = params
            .model
            .as_deref()
            .unwrap_or(self.catalog.default_model.as_str());
        let model = self
            .catalog
            .resolve_model(requested)
            .ok_or_else(|| ProviderError::UnknownModel(requested.to_string()))?;

        let request = self.build_request(&model.id, params)?;
        let started = Instant::now();
        let response = self.fetcher.fetch(request).await?;
        tracing::debug!(
            "OpenRouter {} answered {} in {:?}",
            model.id,
            response.status,
            started.elapsed()
        );

        if response.status != 200 {
            return Err(ProviderError::Status {
                provider: PROVIDER.to_string(),
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_value(response.body).map_err(|e| ProviderError::InvalidResponse {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::EmptyResponse(PROVIDER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::FetchResponse;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct ScriptedFetcher {
        status: u16,
        body: Value,
        seen: Mutex<Vec<FetchRequest>>,
    }

    impl ScriptedFetcher {
        fn new(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpFetcher for ScriptedFetcher {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            Ok(FetchResponse {
                status: self.status,
                headers: BTreeMap::new(),
                body: self.body.clone(),
            })
        }
    }

    fn provider(fetcher: Arc<ScriptedFetcher>) -> OpenRouterProvider {
        let catalog = Arc::new(Catalog::embedded().unwrap());
        OpenRouterProvider::new(fetcher, catalog, &OpenRouterConfig::default())
    }

    #[tokio::test]
    async fn test_success_builds_expected_request() {
        let fetcher = ScriptedFetcher::new(
            200,
            json!({"choices": [{"message": {"role": "assistant", "content": "Hello!"}}]}),
        );
        let provider = provider(fetcher.clone());

        let params = GenerationParams::new("Write")
            .model("kimi")
            .system_prompt("Be brief")
            .max_tokens(6000);
        let text = provider.generate(&params).await.unwrap();
        assert_eq!(text, "Hello!");

        let seen = fetcher.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.url, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(request.headers["Authorization"], "Bearer {{OPENROUTER_API_KEY}}");
        assert_eq!(request.headers["X-Title"], "AI Digital Product Creator");
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));

        let body = request.body.as_ref().unwrap();
        assert_eq!(body["model"], "moonshotai/kimi-dev-72b:free");
        assert_eq!(body["max_tokens"], 6000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Write");
        assert!((body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_model_fails_before_sending() {
        let fetcher = ScriptedFetcher::new(200, json!({}));
        let provider = provider(fetcher.clone());

        let result = provider
            .generate(&GenerationParams::new("x").model("gpt-4o-mini"))
            .await;
        assert!(matches!(result, Err(ProviderError::UnknownModel(_))));
        assert!(fetcher.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_upstream_message() {
        let fetcher = ScriptedFetcher::new(429, json!({"error": {"message": "Rate limit exceeded"}}));
        let err = provider(fetcher)
            .generate(&GenerationParams::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenRouter API error: 429 - Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let fetcher = ScriptedFetcher::new(200, json!({"choices": []}));
        let err = provider(fetcher)
            .generate(&GenerationParams::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse(_)));
    }
}
