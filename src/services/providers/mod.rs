//! Text-generation and web-search providers
//!
//! Every outbound call goes through an [`HttpFetcher`], which substitutes
//! `{{SECRET}}` placeholders from server-side configuration. Providers never
//! see raw API keys.
//!
//! - [`OpenRouterProvider`]: chat completions against the OpenRouter catalog
//! - [`GatewayProvider`]: the generic `generateText` endpoint
//! - [`FallbackGenerator`]: primary provider with a secondary on failure
//! - [`HttpSearchClient`]: cached web search

pub mod fallback;
pub mod fetch;
pub mod gateway;
pub mod openrouter;
pub mod search;

use async_trait::async_trait;

pub use fallback::FallbackGenerator;
pub use fetch::{FetchRequest, FetchResponse, HttpFetcher, ReqwestFetcher};
pub use gateway::GatewayProvider;
pub use openrouter::OpenRouterProvider;
pub use search::{HttpSearchClient, RawSearchResult, SearchKind, SearchResponse, WebSearch};

/// Default completion budget when a caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Errors raised by providers
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Model {0} not found")]
    UnknownModel(String),

    /// Upstream answered with a non-success status
    #[error("{provider} API error: {status} - {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("No response from {0} API")]
    EmptyResponse(String),

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

/// Parameters of one text-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub prompt: String,
    /// Model id; `None` lets the provider use its default
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    /// Ask the provider to ground the answer in web search, when supported
    pub search: bool,
}

impl GenerationParams {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: None,
            search: false,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_search(mut self) -> Self {
        self.search = true;
        self
    }

    /// Prompt with the system prompt prepended, for providers that take a
    /// single string
    pub fn flattened_prompt(&self) -> String {
        match &self.system_prompt {
            Some(system) => format!("{}\n\n{}", system, self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// A text-generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    async fn generate(&self, params: &GenerationParams) -> Result<String, ProviderError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generators and search clients for service tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Returns a canned reply, or fails for models listed in `failing`
    #[derive(Default)]
    pub struct MockGenerator {
        pub reply: String,
        pub failing: Vec<String>,
        pub calls: Mutex<Vec<GenerationParams>>,
    }

    impl MockGenerator {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
                ..Default::default()
            }
        }

        pub fn failing_for(mut self, model: &str) -> Self {
            self.failing.push(model.to_string());
            self
        }

        pub fn calls(&self) -> Vec<GenerationParams> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, params: &GenerationParams) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push(params.clone());
            let model = params.model.clone().unwrap_or_default();
            if self.failing.contains(&model) {
                return Err(ProviderError::Transport(format!("{} is down", model)));
            }
            Ok(self.reply.clone())
        }
    }

    /// Always fails
    pub struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _params: &GenerationParams) -> Result<String, ProviderError> {
            Err(ProviderError::Transport("connection refused".to_string()))
        }
    }

    /// Search client answering from a fixed table; unknown queries fail
    #[derive(Default)]
    pub struct MockSearch {
        pub responses: HashMap<String, SearchResponse>,
        pub queries: Mutex<Vec<String>>,
    }

    impl MockSearch {
        pub fn with(query: &str, response: SearchResponse) -> Self {
            let mut responses = HashMap::new();
            responses.insert(query.to_string(), response);
            Self {
                responses,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl WebSearch for MockSearch {
        async fn search(
            &self,
            query: &str,
            _kind: SearchKind,
            _limit: u32,
        ) -> Result<SearchResponse, ProviderError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.responses
                .get(query)
                .cloned()
                .ok_or_else(|| ProviderError::Transport("search unavailable".to_string()))
        }
    }
}
