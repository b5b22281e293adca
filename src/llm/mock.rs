//! Scripted provider for unit tests

use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex};
use futures::stream;

use crate::llm::{
    provider::{EventStream, LlmProvider},
    types::{ChatRequest, FinishReason, ProviderEvent, ProviderResponse, TokenUsage},
    errors::{LlmError, LlmResult},
};

/// One scripted reaction to a request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Reply with these fragments, in order
    Fragments(Vec<String>),
    /// Emit these fragments, then fail mid-stream
    FailAfter(Vec<String>, String),
    /// Fail before anything is produced
    Fail(String),
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        MockReply::Fragments(vec![text.to_string()])
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        MockReply::Fragments(fragments.iter().map(|f| f.to_string()).collect())
    }
}

/// Provider that replays scripted replies and records every request
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self, request: ChatRequest) -> MockReply {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Fragments(Vec::new()))
    }
}

fn done() -> ProviderEvent {
    ProviderEvent::Done {
        usage: TokenUsage::default(),
        finish_reason: Some(FinishReason::Stop),
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse> {
        match self.next_reply(request) {
            MockReply::Fragments(fragments) => Ok(ProviderResponse {
                content: fragments.concat(),
                usage: TokenUsage::default(),
                finish_reason: Some(FinishReason::Stop),
            }),
            MockReply::FailAfter(_, message) | MockReply::Fail(message) => {
                Err(LlmError::ApiError(message))
            }
        }
    }

    async fn chat_completion_stream(&self, request: ChatRequest) -> LlmResult<EventStream> {
        let events: Vec<LlmResult<ProviderEvent>> = match self.next_reply(request) {
            MockReply::Fragments(fragments) => fragments
                .into_iter()
                .map(|delta| Ok(ProviderEvent::ContentDelta { delta }))
                .chain(std::iter::once(Ok(done())))
                .collect(),
            MockReply::FailAfter(fragments, message) => fragments
                .into_iter()
                .map(|delta| Ok(ProviderEvent::ContentDelta { delta }))
                .chain(std::iter::once(Err(LlmError::StreamError(message))))
                .collect(),
            MockReply::Fail(message) => return Err(LlmError::ApiError(message)),
        };
        Ok(Box::pin(stream::iter(events)))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn validate_config(&self) -> LlmResult<()> {
        Ok(())
    }
}
