//! Async chat-completion client
//!
//! Model-agnostic HTTP client for chat APIs. Supports OpenAI-compatible
//! endpoints (OpenRouter, OpenAI, DeepSeek) and the Anthropic messages API;
//! the format is picked from the endpoint URL.

use crate::core::config::ResolverConfig;
use crate::core::error::{LaiaError, Result};
use crate::llm::context::{Prompt, PromptRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Anything that can turn a prompt into a single text completion
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from the resolver config.
    ///
    /// The credential comes from the environment variable named by
    /// `ai.api_key_env`; an unset or empty variable is an error.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            LaiaError::LlmError(format!("{} not set", config.ai.api_key_env))
        })?;
        Ok(Self::new(
            api_key,
            config.ai.api_url.clone(),
            config.ai.model.clone(),
        ))
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    async fn complete_anthropic(&self, prompt: &Prompt) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: prompt.system.clone(),
            messages: prompt
                .messages
                .iter()
                .map(|m| Message {
                    role: m.role.as_str().into(),
                    content: m.content.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LaiaError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LaiaError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LaiaError::LlmError(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| LaiaError::LlmError("Empty response".into()))
    }

    async fn complete_openai(&self, prompt: &Prompt) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: openai_messages(prompt),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LaiaError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LaiaError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LaiaError::LlmError(e.to_string()))?;

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LaiaError::LlmError("Empty response".into()))
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(prompt).await,
            ApiFormat::OpenAI => self.complete_openai(prompt).await,
        }
    }
}

/// System preamble first, then the conversation
fn openai_messages(prompt: &Prompt) -> Vec<Message> {
    std::iter::once(Message {
        role: PromptRole::System.as_str().into(),
        content: prompt.system.clone(),
    })
    .chain(prompt.messages.iter().map(|m| Message {
        role: m.role.as_str().into(),
        content: m.content.clone(),
    }))
    .collect()
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (OpenRouter, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
