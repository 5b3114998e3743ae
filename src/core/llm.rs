//! Generative provider boundary and the OpenAI Responses client

use async_trait::async_trait;
use std::time::Duration;

use crate::types::EngineError;
use crate::{
    DEFAULT_GENERATIVE_MODEL, DEFAULT_OPENAI_BASE_URL, GENERATION_MAX_OUTPUT_TOKENS,
    GENERATION_TIMEOUT_SECS,
};

const PROVIDER: &str = "generative";

/// Raw HTTP-like reply: status code plus body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Prompt → free text capability
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Send instructions and prompt, return the raw reply
    ///
    /// Transport failures are errors; a reply with a bad status is not.
    async fn generate(
        &self,
        system_instructions: &str,
        user_prompt: &str,
    ) -> Result<ProviderResponse, EngineError>;

    /// Model identifier for health reporting
    fn model_name(&self) -> &str;
}

/// OpenAI Responses API client
#[derive(Clone)]
pub struct OpenAiResponsesClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiResponsesClient {
    /// Create client with the default model and timeout
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_model(
            api_key,
            DEFAULT_GENERATIVE_MODEL,
            Duration::from_secs(GENERATION_TIMEOUT_SECS),
        )
    }

    /// Create with a specific model and request timeout
    pub fn with_model(api_key: Option<String>, model: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: model.to_string(),
        }
    }

    /// Point at a different API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Is a credential configured?
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl GenerativeProvider for OpenAiResponsesClient {
    async fn generate(
        &self,
        system_instructions: &str,
        user_prompt: &str,
    ) -> Result<ProviderResponse, EngineError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EngineError::unavailable(PROVIDER, "OPENAI_API_KEY is not set"))?;

        let response = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": &self.model,
                "input": [
                    {"role": "system", "content": system_instructions},
                    {"role": "user", "content": user_prompt},
                ],
                "max_output_tokens": GENERATION_MAX_OUTPUT_TOKENS,
            }))
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timeout" } else { "transport" };
                EngineError::provider(PROVIDER, format!("{}: {}", kind, e.without_url()))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| EngineError::provider(PROVIDER, format!("body: {}", e.without_url())))?;

        Ok(ProviderResponse::new(status, body))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
