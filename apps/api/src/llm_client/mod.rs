/// Generation Client: the single point of entry for all remote text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation service directly.
/// All optimize / evaluate / analyze requests MUST go through this module.
///
/// Speaks the OpenAI-compatible chat-completions dialect (DeepSeek by default).
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
#[cfg(test)]
pub(crate) mod stub_server;

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;

/// Every way a single generation call can fail. Callers treat all variants as
/// "the remote service failed"; the split exists for logs and diagnostics.
#[derive(Debug, Error)]
pub enum GenerationServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Generation service returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Total attempts per call, including the first. Always at least 1.
    pub max_attempts: u32,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.generation_api_key.clone(),
            base_url: config.generation_api_url.clone(),
            model: config.generation_model.clone(),
            timeout: Duration::from_secs(config.generation_timeout_secs),
            max_attempts: config.generation_max_attempts.max(1),
        }
    }
}

/// The single generation client shared by all services.
/// Cheap to clone; the underlying connection pool is reference-counted.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    settings: GenerationSettings,
}

impl GenerationClient {
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationServiceError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Makes a raw chat-completions call and returns the generated text.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, GenerationServiceError> {
        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let mut last_error: Option<GenerationServiceError> = None;

        for attempt in 0..self.settings.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Generation call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.settings.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    last_error = Some(GenerationServiceError::Timeout {
                        secs: self.settings.timeout.as_secs(),
                    });
                    continue;
                }
                Err(e) => {
                    last_error = Some(GenerationServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => {
                    last_error = Some(GenerationServiceError::Timeout {
                        secs: self.settings.timeout.as_secs(),
                    });
                    continue;
                }
                Err(e) => return Err(GenerationServiceError::Http(e)),
            };

            if status.as_u16() == 429 || status.is_server_error() {
                warn!("Generation service returned {}: {}", status, body);
                last_error = Some(GenerationServiceError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(&body),
                });
                continue;
            }

            if !status.is_success() {
                return Err(GenerationServiceError::Api {
                    status: status.as_u16(),
                    message: parse_error_message(&body),
                });
            }

            return parse_chat_response(&body);
        }

        Err(last_error.unwrap_or(GenerationServiceError::RateLimited {
            retries: self.settings.max_attempts,
        }))
    }

    /// Calls the service and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, GenerationServiceError> {
        let text = self.call(prompt, system).await?;
        parse_json_text(&text)
    }
}

/// 1s, 2s, 4s, ... for attempts 1, 2, 3, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1u64 << (attempt.saturating_sub(1)).min(6)))
}

/// Extracts the generated text from a chat-completions body.
/// A body without choices or message content is malformed, not empty.
pub(crate) fn parse_chat_response(body: &str) -> Result<String, GenerationServiceError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationServiceError::MalformedResponse(format!("invalid body: {e}")))?;

    if let Some(usage) = &response.usage {
        debug!(
            "Generation call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationServiceError::MalformedResponse("no choices".to_string()))?
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| {
            GenerationServiceError::MalformedResponse("choice has no message content".to_string())
        })?;

    if content.trim().is_empty() {
        return Err(GenerationServiceError::EmptyContent);
    }
    Ok(content)
}

/// Prefers the structured `{"error": {"message": ...}}` payload, else the raw body.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ServiceError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

pub(crate) fn parse_json_text<T: DeserializeOwned>(text: &str) -> Result<T, GenerationServiceError> {
    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(text);
    serde_json::from_str(text).map_err(GenerationServiceError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
