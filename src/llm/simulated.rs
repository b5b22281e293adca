//! Offline provider used when no API key is configured

use async_trait::async_trait;
use std::time::Duration;
use futures::stream;
use tokio::time::sleep;
use tracing::debug;

use crate::llm::{
    provider::{EventStream, LlmProvider},
    types::{ChatRequest, FinishReason, ProviderConfig, ProviderEvent, ProviderResponse, TokenUsage},
    errors::LlmResult,
};

/// Canned reply returned in place of a real completion
pub const SIMULATED_RESPONSE: &str = "Simulated Response: Please configure GEMINI_API_KEY to get real responses from Gemini. \n\nBased on your prompt, here is a structured outline you could expect:\n\n1. Context and objectives\n2. Key deliverables\n3. Risks and mitigations\n4. Next steps";

/// Provider that answers every request with [`SIMULATED_RESPONSE`] after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    delay: Duration,
}

impl SimulatedProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(Duration::from_millis(config.simulated_delay_ms))
    }

    async fn wait(&self, request: &ChatRequest) {
        debug!(
            "Simulating {} reply to a {}-message request",
            request.model,
            request.messages.len()
        );
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl LlmProvider for SimulatedProvider {
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse> {
        self.wait(&request).await;
        Ok(ProviderResponse {
            content: SIMULATED_RESPONSE.to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn chat_completion_stream(&self, request: ChatRequest) -> LlmResult<EventStream> {
        self.wait(&request).await;
        let events = vec![
            Ok(ProviderEvent::ContentDelta {
                delta: SIMULATED_RESPONSE.to_string(),
            }),
            Ok(ProviderEvent::Done {
                usage: TokenUsage::default(),
                finish_reason: Some(FinishReason::Stop),
            }),
        ];
        Ok(Box::pin(stream::iter(events)))
    }

    fn name(&self) -> &str {
        "simulated"
    }

    fn validate_config(&self) -> LlmResult<()> {
        Ok(())
    }
}
