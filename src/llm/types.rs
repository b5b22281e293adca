//! Common types for LLM providers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use chrono::{DateTime, Utc};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new_text(role: MessageRole, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: text,
            timestamp: Utc::now(),
        }
    }

    pub fn new_user(text: String) -> Self {
        Self::new_text(MessageRole::User, text)
    }

    #[cfg(test)]
    pub fn new_model(text: String) -> Self {
        Self::new_text(MessageRole::Model, text)
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub thinking_tokens: u32,
    pub total_tokens: u32,
}

/// Finish reason for a completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Other(String),
}

impl FinishReason {
    /// Map the backend's finish reason string
    pub fn from_api(reason: &str) -> Self {
        match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<FinishReason>,
}

/// Events emitted during streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    ContentDelta { delta: String },
    Done {
        usage: TokenUsage,
        finish_reason: Option<FinishReason>,
    },
}

/// Configuration for an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// Artificial latency of the simulated provider
    pub simulated_delay_ms: u64,
    pub extra_headers: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: "gemini".to_string(),
            api_key: None,
            base_url: None,
            timeout_seconds: 120,
            max_retries: 2,
            simulated_delay_ms: 1000,
            extra_headers: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map_or(false, |key| !key.trim().is_empty())
    }
}

/// Which model a request goes to, and with how much reasoning allowance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoice {
    pub model: String,
    pub thinking_budget: Option<u32>,
}

/// Model variants and generation parameters shared by both clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Fast default variant
    pub model: String,
    /// Higher-capability variant used for extended reasoning
    pub reasoning_model: String,
    /// Thinking token budget granted to the reasoning variant
    pub thinking_budget: u32,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_message: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            reasoning_model: "gemini-2.5-pro".to_string(),
            thinking_budget: 32768,
            max_tokens: None,
            temperature: None,
            system_message: None,
        }
    }
}

impl ModelSettings {
    pub fn choose(&self, extended_reasoning: bool) -> ModelChoice {
        if extended_reasoning {
            ModelChoice {
                model: self.reasoning_model.clone(),
                thinking_budget: Some(self.thinking_budget),
            }
        } else {
            ModelChoice {
                model: self.model.clone(),
                thinking_budget: None,
            }
        }
    }

    /// Build a request for `messages` using the variant picked by `extended_reasoning`
    pub fn request(&self, messages: Vec<Message>, extended_reasoning: bool, stream: bool) -> ChatRequest {
        let choice = self.choose(extended_reasoning);
        ChatRequest {
            model: choice.model,
            messages,
            system_message: self.system_message.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            thinking_budget: choice.thinking_budget,
            stream,
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub system_message: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub thinking_budget: Option<u32>,
    pub stream: bool,
}

impl ChatRequest {
    /// Text of the most recent user message
    #[cfg(test)]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_model_variant() {
        let settings = ModelSettings::default();

        let fast = settings.choose(false);
        assert_eq!(fast.model, "gemini-2.5-flash");
        assert_eq!(fast.thinking_budget, None);

        let deep = settings.choose(true);
        assert_eq!(deep.model, "gemini-2.5-pro");
        assert_eq!(deep.thinking_budget, Some(32768));
    }

    #[test]
    fn test_request_carries_settings() {
        let settings = ModelSettings {
            max_tokens: Some(256),
            system_message: Some("be brief".to_string()),
            ..ModelSettings::default()
        };
        let request = settings.request(vec![Message::new_user("hi".to_string())], true, true);

        assert_eq!(request.model, "gemini-2.5-pro");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.system_message.as_deref(), Some("be brief"));
        assert!(request.stream);
        assert_eq!(request.last_user_text(), Some("hi"));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_api("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::from_api("MAX_TOKENS"), FinishReason::Length);
        assert_eq!(FinishReason::from_api("SAFETY"), FinishReason::Safety);
        assert_eq!(
            FinishReason::from_api("LANGUAGE"),
            FinishReason::Other("LANGUAGE".to_string())
        );
    }

    #[test]
    fn test_has_api_key() {
        let mut config = ProviderConfig::default();
        assert!(!config.has_api_key());
        config.api_key = Some("  ".to_string());
        assert!(!config.has_api_key());
        config.api_key = Some("key".to_string());
        assert!(config.has_api_key());
    }
}
