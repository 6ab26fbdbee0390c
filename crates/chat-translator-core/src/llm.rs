//! LLM client for style enhancement and last-resort translation.
//!
//! Single-turn completions only; no conversation state is retained between
//! calls. Failures are surfaced as errors here and converted to "degrade" or
//! "try next" by the callers, never retried in place.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Single-turn LLM completion client.
///
/// The API key is passed per call because it is resolved per request from
/// the override store, not fixed at construction time.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, api_key: &str, system_prompt: &str, user_prompt: &str)
        -> Result<String>;
}

/// OpenAI-compatible chat completions client.
///
/// Works with OpenAI, DeepSeek, llama.cpp server, Ollama, etc.
pub struct OpenAiChatClient {
    client: Client,
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    pub api_base: String,
    /// Model identifier
    pub model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiChatClient {
    /// Create a client sharing the engine's pooled HTTP connection.
    pub fn new(client: Client, config: &LlmConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: Some(0.7),
            max_tokens: Some(500),
        };

        debug!("LLM completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM request failed: {}", e);
                Error::LlmRequest(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API error: {} - {}", status, body);
            return Err(Error::LlmRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse LLM response: {}", e);
            Error::LlmInvalidResponse(e.to_string())
        })?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| Error::LlmInvalidResponse("No choices in response".to_string()))?;

        Ok(content)
    }
}
