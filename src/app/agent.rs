//! Generation and chat clients over an LLM provider
//!
//! Both clients are infallible at their boundary: backend failures are turned
//! into display text so the UI never has to handle provider errors.

use std::{pin::Pin, sync::Arc};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info};

use crate::{
    app::AppEvent,
    llm::{LlmError, LlmProvider, Message, ModelSettings, ProviderEvent},
    session::{to_messages, ChatTurn},
};

/// Text used when the backend replies with nothing
pub const EMPTY_RESPONSE: &str = "No response generated.";

/// Stream of reply fragments; finite and not restartable
pub type FragmentStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Per-call options captured at dispatch time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    pub extended_reasoning: bool,
}

impl GenerationOptions {
    pub fn extended(extended_reasoning: bool) -> Self {
        Self { extended_reasoning }
    }
}

/// Display text for a failed one-shot generation
pub fn generation_error_text(error: &LlmError) -> String {
    format!("Error generating content: {}", error)
}

/// Display text for a failed or interrupted stream
pub fn stream_error_text(error: &LlmError) -> String {
    format!("Error streaming response: {}", error)
}

fn notify(event_tx: &Option<mpsc::UnboundedSender<AppEvent>>, event: AppEvent) {
    if let Some(tx) = event_tx {
        let _ = tx.send(event);
    }
}

/// One-shot text generation
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
    event_tx: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ModelSettings) -> Self {
        Self {
            provider,
            settings,
            event_tx: None,
        }
    }

    /// Report lifecycle events on `event_tx`
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Generate a reply for `prompt`; never fails
    pub async fn generate(&self, prompt: &str, options: GenerationOptions) -> String {
        let request = self.settings.request(
            vec![Message::new_user(prompt.to_string())],
            options.extended_reasoning,
            false,
        );
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(
            "Generating with {} via {} (extended: {})",
            request.model,
            self.provider.name(),
            options.extended_reasoning
        );
        notify(&self.event_tx, AppEvent::GenerationStarted {
            request_id: request_id.clone(),
            model: request.model.clone(),
        });

        match self.provider.chat_completion(request).await {
            Ok(response) => {
                info!(
                    "Generation finished: {} tokens",
                    response.usage.total_tokens
                );
                notify(&self.event_tx, AppEvent::GenerationCompleted {
                    request_id,
                    characters: response.content.chars().count(),
                });
                if response.content.is_empty() {
                    EMPTY_RESPONSE.to_string()
                } else {
                    response.content
                }
            }
            Err(e) => {
                error!("Generation error: {}", e);
                notify(&self.event_tx, AppEvent::GenerationFailed {
                    request_id,
                    error: e.to_string(),
                });
                generation_error_text(&e)
            }
        }
    }
}

/// Multi-turn chat with streamed replies
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
    event_tx: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ModelSettings) -> Self {
        Self {
            provider,
            settings,
            event_tx: None,
        }
    }

    /// Report lifecycle events on `event_tx`
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Stream the model's reply to `message` given the prior `history`.
    ///
    /// A producer task drives the provider stream and forwards fragments over
    /// a channel. Failures yield one error fragment and end the stream.
    pub fn stream_reply(
        &self,
        history: &[ChatTurn],
        message: &str,
        options: GenerationOptions,
    ) -> FragmentStream {
        let request = self.settings.request(
            to_messages(history, message),
            options.extended_reasoning,
            true,
        );
        debug!(
            "Streaming chat reply with {} via {} ({} prior turns)",
            request.model,
            self.provider.name(),
            history.len()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let provider = self.provider.clone();
        let event_tx = self.event_tx.clone();
        let request_id = uuid::Uuid::new_v4().to_string();

        tokio::spawn(async move {
            let mut stream = match provider.chat_completion_stream(request.clone()).await {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Chat stream failed to start: {}", e);
                    let _ = tx.send(stream_error_text(&e));
                    notify(&event_tx, AppEvent::StreamFailed {
                        request_id,
                        error: e.to_string(),
                    });
                    return;
                }
            };

            notify(&event_tx, AppEvent::StreamStarted {
                request_id: request_id.clone(),
                model: request.model,
            });

            let mut fragments = 0;
            while let Some(event) = stream.next().await {
                match event {
                    Ok(ProviderEvent::ContentDelta { delta }) => {
                        if delta.is_empty() {
                            continue;
                        }
                        notify(&event_tx, AppEvent::StreamChunk {
                            request_id: request_id.clone(),
                            chunk: delta.clone(),
                        });
                        if tx.send(delta).is_err() {
                            debug!("Chat stream receiver dropped");
                            break;
                        }
                        fragments += 1;
                    }
                    Ok(ProviderEvent::Done { usage, .. }) => {
                        info!("Chat stream finished: {} tokens", usage.total_tokens);
                        break;
                    }
                    Err(e) => {
                        error!("Chat stream error: {}", e);
                        let _ = tx.send(stream_error_text(&e));
                        notify(&event_tx, AppEvent::StreamFailed {
                            request_id,
                            error: e.to_string(),
                        });
                        return;
                    }
                }
            }

            notify(&event_tx, AppEvent::StreamEnded {
                request_id,
                fragments,
            });
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{
        mock::{MockProvider, MockReply},
        simulated::SimulatedProvider,
        MessageRole,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_generate_returns_text() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("A plan.")]));
        let client = GenerationClient::new(provider.clone(), ModelSettings::default());

        let text = client.generate("Plan it", GenerationOptions::default()).await;
        assert_eq!(text, "A plan.");

        let requests = provider.requests();
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert_eq!(requests[0].last_user_text(), Some("Plan it"));
    }

    #[tokio::test]
    async fn test_generate_extended_uses_reasoning_model() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("deep")]));
        let client = GenerationClient::new(provider.clone(), ModelSettings::default());

        client.generate("Think", GenerationOptions::extended(true)).await;
        let request = &provider.requests()[0];
        assert_eq!(request.model, "gemini-2.5-pro");
        assert_eq!(request.thinking_budget, Some(32768));
    }

    #[tokio::test]
    async fn test_generate_empty_and_error_become_text() {
        let provider = Arc::new(MockProvider::new(vec![
            MockReply::text(""),
            MockReply::Fail("quota exhausted".to_string()),
        ]));
        let client = GenerationClient::new(provider, ModelSettings::default());

        assert_eq!(client.generate("a", GenerationOptions::default()).await, EMPTY_RESPONSE);
        let error = client.generate("b", GenerationOptions::default()).await;
        assert!(error.starts_with("Error generating content:"));
        assert!(error.contains("quota exhausted"));
    }

    #[tokio::test]
    async fn test_generate_without_credential_is_simulated() {
        let client = GenerationClient::new(
            Arc::new(SimulatedProvider::new(Duration::ZERO)),
            ModelSettings::default(),
        );
        let text = client.generate("anything", GenerationOptions::default()).await;
        assert!(text.contains("Simulated"));
    }

    #[tokio::test]
    async fn test_generate_reports_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("ok")]));
        let client = GenerationClient::new(provider, ModelSettings::default()).with_events(tx);

        client.generate("x", GenerationOptions::default()).await;
        assert!(matches!(rx.recv().await, Some(AppEvent::GenerationStarted { .. })));
        assert!(matches!(rx.recv().await, Some(AppEvent::GenerationCompleted { characters: 2, .. })));
    }

    #[tokio::test]
    async fn test_stream_reply_fragments_concatenate() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::fragments(&["Sprint ", "goal ", "set."])]));
        let client = ChatClient::new(provider.clone(), ModelSettings::default());

        let history = vec![ChatTurn::user("hello"), ChatTurn::model("hi")];
        let fragments: Vec<String> = client
            .stream_reply(&history, "set a goal", GenerationOptions::default())
            .collect()
            .await;

        assert_eq!(fragments.concat(), "Sprint goal set.");

        let request = &provider.requests()[0];
        assert!(request.stream);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[1].role, MessageRole::Model);
        assert_eq!(request.last_user_text(), Some("set a goal"));
    }

    #[tokio::test]
    async fn test_stream_reply_mid_stream_failure() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::FailAfter(
            vec!["partial".to_string()],
            "connection reset".to_string(),
        )]));
        let client = ChatClient::new(provider, ModelSettings::default());

        let fragments: Vec<String> = client
            .stream_reply(&[], "go", GenerationOptions::default())
            .collect()
            .await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "partial");
        assert!(fragments[1].starts_with("Error streaming response:"));
        assert!(fragments[1].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_stream_reply_connect_failure() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::Fail("unreachable".to_string())]));
        let client = ChatClient::new(provider, ModelSettings::default());

        let fragments: Vec<String> = client
            .stream_reply(&[], "go", GenerationOptions::default())
            .collect()
            .await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].contains("unreachable"));
    }

    #[tokio::test]
    async fn test_stream_reply_without_credential_is_simulated() {
        let client = ChatClient::new(
            Arc::new(SimulatedProvider::new(Duration::ZERO)),
            ModelSettings::default(),
        );
        let fragments: Vec<String> = client
            .stream_reply(&[], "hi", GenerationOptions::default())
            .collect()
            .await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].starts_with("Simulated Response:"));
    }
}
