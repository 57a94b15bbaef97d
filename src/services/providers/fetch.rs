//! Outbound HTTP with server-side secrets
//!
//! Callers describe requests with `{{NAME}}` placeholders (for example
//! `Bearer {{OPENROUTER_API_KEY}}`); the fetcher fills them from its secret
//! map just before sending. Unknown placeholders are sent untouched.

use super::ProviderError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// A request to send
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Overrides the client-wide timeout for this request
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            headers: BTreeMap::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }
}

/// The upstream answer. Non-JSON bodies arrive as a JSON string.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl FetchResponse {
    /// `error.message` from an OpenAI-style error body, if present
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
    }
}

#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ProviderError>;
}

/// reqwest-backed fetcher
pub struct ReqwestFetcher {
    client: reqwest::Client,
    secrets: HashMap<String, String>,
    placeholder: Regex,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, secrets: HashMap<String, String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            secrets,
            placeholder: placeholder_regex()?,
        })
    }

    fn resolve(&self, request: FetchRequest) -> FetchRequest {
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    replace_placeholders(&self.placeholder, v, &self.secrets),
                )
            })
            .collect();

        FetchRequest {
            url: replace_placeholders(&self.placeholder, &request.url, &self.secrets),
            method: request.method.to_uppercase(),
            headers,
            body: request
                .body
                .as_ref()
                .map(|b| replace_placeholders_in_json(&self.placeholder, b, &self.secrets)),
            timeout: request.timeout,
        }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ProviderError> {
        let request = self.resolve(request);

        let mut builder = match request.method.as_str() {
            "GET" => self.client.get(&request.url),
            "POST" => self.client.post(&request.url),
            "PUT" => self.client.put(&request.url),
            "DELETE" => self.client.delete(&request.url),
            "PATCH" => self.client.patch(&request.url),
            other => {
                return Err(ProviderError::Transport(format!(
                    "Unsupported HTTP method: {}",
                    other
                )))
            }
        };

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (key, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(key.to_string(), value.to_string());
            }
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read response body: {}", e)))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

pub(crate) fn placeholder_regex() -> anyhow::Result<Regex> {
    Regex::new(r"\{\{(\w+)\}\}").map_err(|e| anyhow::anyhow!("Regex error: {}", e))
}

/// Replace `{{NAME}}` with `secrets[NAME]`; unknown names stay as written
pub(crate) fn replace_placeholders(
    re: &Regex,
    text: &str,
    secrets: &HashMap<String, String>,
) -> String {
    re.replace_all(text, |caps: &regex::Captures| {
        secrets
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Apply [`replace_placeholders`] to every string inside a JSON value
pub(crate) fn replace_placeholders_in_json(
    re: &Regex,
    value: &Value,
    secrets: &HashMap<String, String>,
) -> Value {
    match value {
        Value::String(s) => Value::String(replace_placeholders(re, s, secrets)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), replace_placeholders_in_json(re, v, secrets)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| replace_placeholders_in_json(re, v, secrets))
                .collect(),
        ),
        _ => value.clone(),
    }
}
