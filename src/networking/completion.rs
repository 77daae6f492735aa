//! Chat-completion client for AI players and the expert
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (OpenRouter by
//! default) with the blocking `reqwest` client. Calls block the turn loop and
//! carry no request deadline.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::AiSettings;
use crate::core::error::{GameError, GameResult};

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Anything that can answer a [`ChatRequest`] with text
pub trait CompletionClient {
    fn complete(&self, request: &ChatRequest) -> GameResult<String>;
}

/// Blocking client for OpenRouter and other OpenAI-compatible services
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from the AI settings, `None` when no API key is set
    pub fn from_settings(settings: &AiSettings) -> Option<Self> {
        settings
            .api_key()
            .map(|key| Self::new(settings.base_url.clone(), key))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl CompletionClient for OpenRouterClient {
    fn complete(&self, request: &ChatRequest) -> GameResult<String> {
        debug!("[AI] POST {} model={}", self.endpoint(), request.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|err| GameError::AiRequest {
                message: format!("request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: ChatCompletionResponse =
            response.json().map_err(|err| GameError::AiRequest {
                message: format!("unreadable response: {err}"),
            })?;

        extract_text_response(parsed)
    }
}

/// Stand-in used when no API key is configured or `--offline` is set
pub struct DisabledCompletion {
    pub reason: String,
}

impl CompletionClient for DisabledCompletion {
    fn complete(&self, _request: &ChatRequest) -> GameResult<String> {
        Err(GameError::AiRequest {
            message: self.reason.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> GameResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| GameError::AiRequest {
            message: "response contained no content".to_string(),
        })
}

fn map_http_error(status: StatusCode, body: &str) -> GameError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());
    GameError::AiRequest {
        message: format!("HTTP {}: {}", status.as_u16(), message),
    }
}
