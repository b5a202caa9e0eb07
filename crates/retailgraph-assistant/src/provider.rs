//! Chat-completion providers.
//!
//! One trait, two implementations: an HTTP client for any
//! OpenAI-compatible `/chat/completions` endpoint, and a scripted mock for
//! tests. Provider selection and credentials come from the environment,
//! resolved once into a [`ProviderConfig`] value at process start.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Chat-completions endpoint base, e.g. `https://api.openai.com/v1`.
pub const LLM_BASE_URL_ENV: &str = "RETAILGRAPH_LLM_BASE_URL";
/// Bearer token for the endpoint. Unset means the assistant is disabled.
pub const LLM_API_KEY_ENV: &str = "RETAILGRAPH_LLM_API_KEY";
/// Model identifier passed through to the endpoint.
pub const LLM_MODEL_ENV: &str = "RETAILGRAPH_LLM_MODEL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no LLM provider configured. Set {LLM_API_KEY_ENV} (and optionally {LLM_BASE_URL_ENV}, {LLM_MODEL_ENV})")]
    NotConfigured,
    #[error("chat request failed: {0}")]
    Http(String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Provider settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Load from environment variables. Errors when no API key is set:
    /// the assistant surface is optional and must fail loudly rather than
    /// send unauthenticated requests.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = match std::env::var(LLM_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Err(ProviderError::NotConfigured),
        };
        Ok(Self {
            base_url: std::env::var(LLM_BASE_URL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: std::env::var(LLM_MODEL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

/// A single system+user chat turn.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// OpenAI-compatible chat-completions client.
pub struct HttpProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatProvider for HttpProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if !status.is_success() {
            let detail = payload["error"]["message"]
                .as_str()
                .unwrap_or("no error detail")
                .to_string();
            return Err(ProviderError::Http(format!("{status}: {detail}")));
        }

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Malformed("response has no message content".to_string()))
    }
}

/// Scripted provider for tests: replays its responses in order, repeating
/// the last one when the script runs out.
pub struct MockProvider {
    responses: Vec<String>,
    next: AtomicUsize,
}

impl MockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            next: AtomicUsize::new(0),
        }
    }

    pub fn always(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(idx.min(self.responses.len().saturating_sub(1)))
            .cloned()
            .ok_or_else(|| ProviderError::Malformed("mock has no responses".to_string()))
    }
}
