//! Anthropic provider - implementation of AiProvider for the Claude API.
//!
//! Streams replies via SSE (`content_block_delta` events) and runs
//! structured extraction as a non-streaming call whose answer is parsed as a
//! single JSON object.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AiError, AiProvider, ChatRole, ExtractionRequest, ProviderInfo, ReplyChunk, ReplyRequest,
    ReplyStream,
};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures (extraction calls only).
    pub max_retries: u32,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::InvalidRequest(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    async fn send(&self, body: &AnthropicRequest) -> Result<Response, AiError> {
        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AiError::network(format!("connection failed: {}", e))
                } else {
                    AiError::network(e.to_string())
                }
            })
    }

    async fn check_status(&self, response: Response) -> Result<Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(AiError::AuthenticationFailed),
            429 => Err(AiError::rate_limited(60)),
            400 => Err(AiError::InvalidRequest(error_body)),
            500..=599 => Err(AiError::unavailable(format!(
                "server error {}: {}",
                status, error_body
            ))),
            _ => Err(AiError::network(format!(
                "unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    fn reply_body(&self, request: &ReplyRequest, stream: bool) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = request
            .messages
            .iter()
            .map(|m| AnthropicMessage {
                role: match m.role {
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            })
            .collect();

        // The API requires the history to open with a user message.
        if messages.first().map(|m| m.role.as_str()) != Some("user") {
            messages.insert(
                0,
                AnthropicMessage {
                    role: "user".to_string(),
                    content: "Hello".to_string(),
                },
            );
        }

        AnthropicRequest {
            model: self.config.model.clone(),
            messages,
            system: Some(request.system_prompt.clone()),
            max_tokens: request.max_tokens,
            stream: Some(stream),
        }
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    async fn stream_reply(&self, request: ReplyRequest) -> Result<ReplyStream, AiError> {
        let body = self.reply_body(&request, true);
        let response = self.send(&body).await?;
        let response = self.check_status(response).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk_result| match chunk_result {
                Ok(bytes) => parse_sse_chunks(&String::from_utf8_lossy(&bytes)),
                Err(e) => vec![Err(AiError::network(format!("stream error: {}", e)))],
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    async fn extract_structured(
        &self,
        request: ExtractionRequest,
    ) -> Result<serde_json::Value, AiError> {
        let prompt = format!(
            "{}\n\nAnswer with a single JSON object conforming to this JSON \
             schema, and nothing else:\n{}",
            request.prompt, request.schema
        );
        let body = AnthropicRequest {
            model: self.config.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            system: None,
            max_tokens: request.max_tokens,
            stream: None,
        };

        let mut last_error = AiError::network("no attempts made");
        for attempt in 0..=self.config.max_retries {
            let result = async {
                let response = self.send(&body).await?;
                let response = self.check_status(response).await?;
                let parsed: AnthropicResponse = response
                    .json()
                    .await
                    .map_err(|e| AiError::parse(format!("response body: {}", e)))?;
                let text = parsed
                    .content
                    .into_iter()
                    .filter_map(|block| {
                        if block.block_type == "text" {
                            block.text
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("");
                parse_json_answer(&text)
            }
            .await;

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    sleep(Duration::from_secs(1 << attempt)).await;
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model)
    }
}

/// Parses Anthropic SSE lines into reply chunks.
///
/// ```text
/// event: content_block_delta
/// data: {"type":"content_block_delta","delta":{"text":"Hello"}}
/// ```
fn parse_sse_chunks(text: &str) -> Vec<Result<ReplyChunk, AiError>> {
    let mut results = Vec::new();
    let mut current_event = String::new();

    for line in text.lines() {
        if let Some(event_type) = line.strip_prefix("event: ") {
            current_event = event_type.to_string();
        } else if let Some(data) = line.strip_prefix("data: ") {
            match current_event.as_str() {
                "content_block_delta" => {
                    if let Ok(delta) = serde_json::from_str::<ContentBlockDelta>(data) {
                        if let Some(text) = delta.delta.text {
                            if !text.is_empty() {
                                results.push(Ok(ReplyChunk::content(&text)));
                            }
                        }
                    }
                }
                "message_stop" => {
                    results.push(Ok(ReplyChunk::final_chunk()));
                }
                "error" => {
                    if let Ok(error) = serde_json::from_str::<StreamError>(data) {
                        results.push(Err(AiError::unavailable(
                            error
                                .error
                                .message
                                .unwrap_or_else(|| "stream error".to_string()),
                        )));
                    }
                }
                _ => {
                    // Ignore message_start, content_block_start, ping, etc.
                }
            }
        }
    }

    results
}

/// Extracts the JSON object from the model's text answer, tolerating a
/// markdown code fence or surrounding prose.
fn parse_json_answer(text: &str) -> Result<serde_json::Value, AiError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let candidate = if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start..];
        let inner_start = after.find('\n').map(|i| start + i + 1).unwrap_or(start);
        let inner = &trimmed[inner_start..];
        match inner.find("```") {
            Some(end) => inner[..end].trim(),
            None => inner.trim(),
        }
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            &trimmed[start..=end]
        } else {
            trimmed
        }
    } else {
        trimmed
    };

    serde_json::from_str(candidate)
        .map_err(|e| AiError::parse(format!("extraction answer not JSON: {}", e)))
}

// ----- Anthropic API types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: TextDelta,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    error: StreamErrorBody,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_block_delta_events() {
        let sse = "event: content_block_delta\n\
                   data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hello\"}}\n\
                   event: content_block_delta\n\
                   data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\" there\"}}\n";
        let chunks = parse_sse_chunks(sse);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().delta, "Hello");
        assert_eq!(chunks[1].as_ref().unwrap().delta, " there");
    }

    #[test]
    fn message_stop_produces_final_chunk() {
        let sse = "event: message_stop\ndata: {\"type\":\"message_stop\"}\n";
        let chunks = parse_sse_chunks(sse);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].as_ref().unwrap().is_final);
    }

    #[test]
    fn stream_errors_surface_as_unavailable() {
        let sse = "event: error\n\
                   data: {\"error\":{\"message\":\"overloaded\"}}\n";
        let chunks = parse_sse_chunks(sse);
        assert!(matches!(chunks[0], Err(AiError::Unavailable { .. })));
    }

    #[test]
    fn ignores_unrelated_events() {
        let sse = "event: message_start\ndata: {\"type\":\"message_start\"}\n\
                   event: ping\ndata: {}\n";
        assert!(parse_sse_chunks(sse).is_empty());
    }

    #[test]
    fn parses_bare_json_answer() {
        let value = parse_json_answer(r#"{"confidence": 80}"#).unwrap();
        assert_eq!(value["confidence"], 80);
    }

    #[test]
    fn parses_fenced_json_answer() {
        let text = "Here you go:\n```json\n{\"confidence\": 80}\n```\nDone.";
        let value = parse_json_answer(text).unwrap();
        assert_eq!(value["confidence"], 80);
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let text = "Sure. {\"a\": 1, \"b\": {\"c\": 2}} Hope that helps.";
        let value = parse_json_answer(text).unwrap();
        assert_eq!(value["b"]["c"], 2);
    }

    #[test]
    fn rejects_non_json_answer() {
        assert!(parse_json_answer("I could not determine that.").is_err());
    }

    #[test]
    fn reply_body_prepends_user_message_when_history_opens_with_assistant() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("key")).unwrap();
        let request = ReplyRequest::new(
            "prompt",
            vec![crate::ports::ChatMessage::assistant("Welcome back")],
        );
        let body = provider.reply_body(&request, false);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.messages.len(), 2);
    }
}
