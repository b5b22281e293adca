//! Google Gemini provider implementation

use async_trait::async_trait;
use std::time::Duration;
use futures::{stream, StreamExt};
use reqwest::{Client, header::{HeaderMap, HeaderValue, CONTENT_TYPE}};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::{
    provider::{EventStream, LlmProvider, ProviderClientOptions, utils},
    types::{
        ChatRequest, ProviderResponse, ProviderEvent, ProviderConfig, Message, TokenUsage,
        FinishReason,
    },
    errors::{LlmError, LlmResult},
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API provider
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
    options: ProviderClientOptions,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let mut headers = HeaderMap::new();

        match config.api_key.as_deref() {
            Some(api_key) if !api_key.trim().is_empty() => {
                let mut key_value = HeaderValue::from_str(api_key.trim())
                    .map_err(|e| LlmError::ConfigError(format!("Invalid API key: {}", e)))?;
                key_value.set_sensitive(true);
                headers.insert("x-goog-api-key", key_value);
            }
            _ => return Err(LlmError::ConfigError("API key is required".to_string())),
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (key, value) in &config.extra_headers {
            let header_name: reqwest::header::HeaderName = key.parse()
                .map_err(|e| LlmError::ConfigError(format!("Invalid header name '{}': {}", key, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| LlmError::ConfigError(format!("Invalid header value for '{}': {}", key, e)))?;
            headers.insert(header_name, header_value);
        }

        let options = ProviderClientOptions::from_config(&config);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds))
            .user_agent(&options.user_agent)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            options,
        })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Get the API endpoint URL for `model`
    fn endpoint(&self, model: &str, stream: bool) -> String {
        if stream {
            format!("{}/v1beta/models/{}:streamGenerateContent?alt=sse", self.base_url(), model)
        } else {
            format!("{}/v1beta/models/{}:generateContent", self.base_url(), model)
        }
    }

    /// Execute request with retries
    async fn execute_request(&self, url: &str, body: &GeminiRequest) -> LlmResult<GeminiResponse> {
        let mut last_error = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                utils::exponential_backoff_with_jitter(attempt, self.options.retry_delay_ms).await;
                debug!("Retrying Gemini request (attempt {})", attempt + 1);
            }

            let error = match self.client.post(url).json(body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<GeminiResponse>().await.map_err(LlmError::HttpError);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let message = utils::extract_error_message(resp).await;
                    utils::error_for_status(status, message)
                }
                Err(e) => LlmError::HttpError(e),
            };

            if !utils::is_retryable_error(&error) || attempt == self.options.max_retries {
                return Err(error);
            }
            warn!("Gemini request failed, will retry: {}", error);
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| LlmError::ApiError("Unknown error".to_string())))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse> {
        let body = GeminiRequest::from_chat_request(&request);
        let url = self.endpoint(&request.model, false);
        debug!("Sending generateContent to {}", request.model);

        let response = self.execute_request(&url, &body).await?;
        response.into_provider_response()
    }

    async fn chat_completion_stream(&self, request: ChatRequest) -> LlmResult<EventStream> {
        let body = GeminiRequest::from_chat_request(&request);
        let url = self.endpoint(&request.model, true);
        debug!("Opening streamGenerateContent to {}", request.model);

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::HttpError)?;

        if !response.status().is_success() {
            let status = response.status();
            let message = utils::extract_error_message(response).await;
            return Err(utils::error_for_status(status, message));
        }

        // `None` marks the end of the body so the buffer can flush its tail
        let events = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(futures::future::ready(None)))
            .scan(SseBuffer::default(), |buffer, chunk| {
                let payloads = match chunk {
                    Some(Ok(bytes)) => buffer.push(&bytes),
                    Some(Err(e)) => return futures::future::ready(Some(vec![Err(LlmError::HttpError(e))])),
                    None => buffer.finish(),
                };
                let events = payloads
                    .iter()
                    .flat_map(|payload| parse_stream_payload(payload))
                    .collect::<Vec<_>>();
                futures::future::ready(Some(events))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(events))
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn validate_config(&self) -> LlmResult<()> {
        if !self.config.has_api_key() {
            return Err(LlmError::ConfigError("API key is required".to_string()));
        }
        Ok(())
    }
}

/// Accumulates raw SSE bytes and yields complete `data:` payloads
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if !data.is_empty() && data != "[DONE]" {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }

    /// Payload of a final line that arrived without a newline
    fn finish(&mut self) -> Vec<String> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        self.pending.push(b'\n');
        self.push(&[])
    }
}

/// Turn one streamed chunk into provider events
fn parse_stream_payload(payload: &str) -> Vec<LlmResult<ProviderEvent>> {
    let chunk: GeminiResponse = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => return vec![Err(LlmError::JsonError(e))],
    };

    if let Some(error) = chunk.error {
        return vec![Err(LlmError::StreamError(error.message))];
    }
    if let Some(reason) = chunk.blocked_reason() {
        return vec![Err(LlmError::Blocked(reason))];
    }

    let mut events = Vec::new();
    let text = chunk.text();
    if !text.is_empty() {
        events.push(Ok(ProviderEvent::ContentDelta { delta: text }));
    }
    if let Some(reason) = chunk.finish_reason() {
        events.push(Ok(ProviderEvent::Done {
            usage: chunk.usage(),
            finish_reason: Some(reason),
        }));
    }
    events
}

// Gemini API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    fn from_chat_request(request: &ChatRequest) -> Self {
        let contents = request.messages.iter().map(GeminiContent::from_message).collect();

        let system_instruction = request.system_message.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::text(text)],
        });

        let generation_config = GeminiGenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            thinking_config: request
                .thinking_budget
                .map(|budget| GeminiThinkingConfig { thinking_budget: budget }),
        };

        Self {
            contents,
            system_instruction,
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_message(message: &Message) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            parts: vec![GeminiPart::text(&message.content)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            thought: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

impl GeminiGenerationConfig {
    fn is_empty(&self) -> bool {
        self.max_output_tokens.is_none() && self.temperature.is_none() && self.thinking_config.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    error: Option<GeminiError>,
}

impl GeminiResponse {
    /// Visible text of the first candidate, skipping thought parts
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought.unwrap_or(false))
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .map(FinishReason::from_api)
    }

    fn blocked_reason(&self) -> Option<String> {
        self.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone())
    }

    fn usage(&self) -> TokenUsage {
        self.usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                thinking_tokens: u.thoughts_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default()
    }

    fn into_provider_response(self) -> LlmResult<ProviderResponse> {
        if let Some(error) = &self.error {
            return Err(LlmError::ApiError(error.message.clone()));
        }
        if let Some(reason) = self.blocked_reason() {
            return Err(LlmError::Blocked(reason));
        }
        Ok(ProviderResponse {
            content: self.text(),
            usage: self.usage(),
            finish_reason: self.finish_reason(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    thoughts_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ModelSettings;

    fn provider(base_url: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(ProviderConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.map(str::to_string),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            GeminiProvider::new(ProviderConfig::default()),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_endpoints() {
        let p = provider(Some("http://localhost:8080/"));
        assert_eq!(
            p.endpoint("gemini-2.5-flash", false),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider(None).endpoint("gemini-2.5-pro", true),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let settings = ModelSettings {
            system_message: Some("You are a PM coach.".to_string()),
            ..ModelSettings::default()
        };
        let request = settings.request(
            vec![
                Message::new_user("hello".to_string()),
                Message::new_model("hi there".to_string()),
                Message::new_user("plan a sprint".to_string()),
            ],
            true,
            true,
        );

        let body = serde_json::to_value(GeminiRequest::from_chat_request(&request)).unwrap();
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "plan a sprint");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a PM coach.");
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 32768);
    }

    #[test]
    fn test_request_body_omits_empty_generation_config() {
        let request = ModelSettings::default().request(vec![Message::new_user("x".to_string())], false, false);
        let body = serde_json::to_value(GeminiRequest::from_chat_request(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_skips_thoughts() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "pondering", "thought": true},
                    {"text": "Hello "},
                    {"text": "world"}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "thoughtsTokenCount": 7, "totalTokenCount": 13}
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let response = response.into_provider_response().unwrap();

        assert_eq!(response.content, "Hello world");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.thinking_tokens, 7);
        assert_eq!(response.usage.total_tokens, 13);
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_provider_response(), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_sse_buffer_handles_split_lines() {
        let mut buffer = SseBuffer::default();
        assert!(buffer.push(b"data: {\"a\":").is_empty());
        let payloads = buffer.push(b"1}\r\n\r\ndata: {\"b\":2}\n\n: keep-alive\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    }

    #[test]
    fn test_sse_buffer_flushes_unterminated_line() {
        let mut buffer = SseBuffer::default();
        assert!(buffer.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}").len() == 1);
        assert_eq!(buffer.finish(), vec!["{\"b\":2}".to_string()]);
        assert!(buffer.finish().is_empty());
    }

    #[test]
    fn test_response_text_is_verbatim() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"line one\r\nline two\t| x |"}]}}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "line one\r\nline two\t| x |");
    }

    #[test]
    fn test_sse_buffer_handles_split_utf8() {
        let mut buffer = SseBuffer::default();
        let line = "data: {\"t\":\"→\"}\n".as_bytes();
        let (head, tail) = line.split_at(14);
        assert!(buffer.push(head).is_empty());
        assert_eq!(buffer.push(tail), vec!["{\"t\":\"→\"}".to_string()]);
    }

    #[test]
    fn test_parse_stream_payload() {
        let events = parse_stream_payload(
            r#"{"candidates":[{"content":{"parts":[{"text":"chunk"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(ProviderEvent::ContentDelta { delta }) if delta == "chunk"));
        assert!(matches!(&events[1], Ok(ProviderEvent::Done { .. })));

        let errors = parse_stream_payload(r#"{"error":{"code":500,"message":"backend exploded"}}"#);
        assert!(matches!(&errors[0], Err(LlmError::StreamError(m)) if m == "backend exploded"));

        assert!(matches!(&parse_stream_payload("not json")[0], Err(LlmError::JsonError(_))));
    }
}
