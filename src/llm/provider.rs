//! Provider trait and factory for LLM providers

use async_trait::async_trait;
use std::{pin::Pin, sync::Arc};
use futures::Stream;
use tracing::warn;
use crate::llm::{
    types::{ChatRequest, ProviderResponse, ProviderEvent, ProviderConfig},
    errors::{LlmError, LlmResult},
    gemini::GeminiProvider,
    simulated::SimulatedProvider,
};

/// Stream of incremental events from a provider
pub type EventStream = Pin<Box<dyn Stream<Item = LlmResult<ProviderEvent>> + Send>>;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a completion request and get the whole response
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse>;

    /// Send a completion request and get a stream of events
    async fn chat_completion_stream(&self, request: ChatRequest) -> LlmResult<EventStream>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Validate the configuration
    fn validate_config(&self) -> LlmResult<()>;
}

/// Factory for creating LLM providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a new provider from configuration.
    ///
    /// A Gemini configuration without an API key degrades to the simulated
    /// provider instead of failing.
    pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
        match config.provider_type.as_str() {
            "gemini" if config.has_api_key() => {
                let provider = GeminiProvider::new(config)?;
                Ok(Arc::new(provider))
            }
            "gemini" => {
                warn!("No Gemini API key found in environment or config; responses will be simulated");
                Ok(Arc::new(SimulatedProvider::from_config(&config)))
            }
            "simulated" => Ok(Arc::new(SimulatedProvider::from_config(&config))),
            _ => Err(LlmError::ConfigError(format!(
                "Unsupported provider type: {}",
                config.provider_type
            ))),
        }
    }

    /// Get available provider types
    pub fn available_providers() -> Vec<&'static str> {
        vec!["gemini", "simulated"]
    }
}

/// Provider client options for flexible configuration
#[derive(Debug, Clone)]
pub struct ProviderClientOptions {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ProviderClientOptions {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 1000,
            timeout_seconds: 120,
            user_agent: crate::version::user_agent(),
        }
    }
}

impl ProviderClientOptions {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout_seconds: config.timeout_seconds,
            ..Self::default()
        }
    }
}

/// Utility functions for provider implementations
pub mod utils {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;
    use rand::Rng;

    /// Exponential backoff with jitter
    pub async fn exponential_backoff_with_jitter(attempt: u32, base_delay_ms: u64) {
        // ThreadRng is not Send; drop it before suspending
        let jitter = rand::thread_rng().gen_range(0.0..=1.0);
        sleep(backoff_delay(attempt, base_delay_ms, jitter)).await;
    }

    /// Delay for `attempt` given a jitter factor in `0.0..=1.0`, capped at 30 seconds
    pub fn backoff_delay(attempt: u32, base_delay_ms: u64, jitter: f64) -> Duration {
        let delay_ms = (base_delay_ms as f64 * 2.0_f64.powi(attempt as i32) * (1.0 + jitter)) as u64;
        Duration::from_millis(delay_ms.min(30000))
    }

    /// Check if an error is retryable
    pub fn is_retryable_error(error: &LlmError) -> bool {
        match error {
            LlmError::RateLimitError(_) => true,
            LlmError::HttpError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(false, |status| {
                        status.is_server_error() || status == 429 || status == 408
                    })
            }
            LlmError::TimeoutError(_) => true,
            _ => false,
        }
    }

    /// Extract error message from an HTTP error body
    pub fn error_message_from_body(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(message) = json.pointer("/error/message").and_then(|m| m.as_str()) {
                return format!("{}: {}", status, message);
            }
        }
        format!("{}: {}", status, body)
    }

    /// Extract error message from HTTP response
    pub async fn extract_error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(text) => error_message_from_body(status, &text),
            Err(_) => format!("{}: Failed to read error response", status),
        }
    }

    /// Classify a non-success status into a provider error
    pub fn error_for_status(status: reqwest::StatusCode, message: String) -> LlmError {
        match status.as_u16() {
            429 => LlmError::RateLimitError(message),
            401 | 403 => LlmError::AuthError(message),
            408 | 504 => LlmError::TimeoutError(message),
            _ => LlmError::ApiError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_factory_falls_back_without_key() {
        let provider = ProviderFactory::create_provider(ProviderConfig::default()).unwrap();
        assert_eq!(provider.name(), "simulated");
    }

    #[test]
    fn test_factory_builds_gemini_with_key() {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..ProviderConfig::default()
        };
        let provider = ProviderFactory::create_provider(config).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert!(provider.validate_config().is_ok());
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = ProviderConfig {
            provider_type: "openai".to_string(),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            ProviderFactory::create_provider(config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(utils::backoff_delay(0, 1000, 0.0).as_millis(), 1000);
        assert_eq!(utils::backoff_delay(1, 1000, 0.5).as_millis(), 3000);
        assert_eq!(utils::backoff_delay(10, 1000, 1.0).as_millis(), 30000);
    }

    #[tokio::test]
    async fn test_backoff_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let backoff = utils::exponential_backoff_with_jitter(1, 0);
        assert_send(&backoff);
        backoff.await;
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            utils::error_message_from_body(StatusCode::BAD_REQUEST, body),
            "400 Bad Request: API key not valid"
        );
        assert_eq!(
            utils::error_message_from_body(StatusCode::BAD_GATEWAY, "upstream"),
            "502 Bad Gateway: upstream"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            utils::error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            LlmError::RateLimitError(_)
        ));
        assert!(matches!(
            utils::error_for_status(StatusCode::FORBIDDEN, String::new()),
            LlmError::AuthError(_)
        ));
        assert!(utils::is_retryable_error(&LlmError::RateLimitError(String::new())));
        assert!(!utils::is_retryable_error(&LlmError::AuthError(String::new())));
    }
}
