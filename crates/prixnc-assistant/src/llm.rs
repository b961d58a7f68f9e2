//! Hosted chat-completion model client.

use std::time::Duration;

use async_trait::async_trait;
use prixnc_core::AppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

/// Temperature for item extraction.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;
/// Temperature for shopping recommendations.
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.2;

/// Single-turn text completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends `prompt` as one user message and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Model`] on transport failure, non-2xx
    /// status, or a response without any choice.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AssistantError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    /// # Errors
    ///
    /// Returns [`AssistantError::Model`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AssistantError::Model(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Builds a client when `OPENAI_API_KEY` is configured, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Model`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, AssistantError> {
        config
            .openai_api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    key,
                    &config.llm_base_url,
                    &config.llm_model,
                    config.llm_timeout_secs,
                )
            })
            .transpose()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AssistantError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        tracing::debug!(model = %self.model, temperature, "sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Model(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Model(format!(
                "chat model returned {status}: {error_body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Model(format!("chat response parse error: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| AssistantError::Model("chat response has no choices".to_string()))
    }
}
