//! Application events for the event-driven architecture

use serde::{Deserialize, Serialize};

/// Events that can occur in the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A one-shot generation was dispatched
    GenerationStarted {
        request_id: String,
        model: String,
    },

    /// A one-shot generation produced text
    GenerationCompleted {
        request_id: String,
        characters: usize,
    },

    /// A one-shot generation failed and was converted to display text
    GenerationFailed {
        request_id: String,
        error: String,
    },

    /// A streaming response started
    StreamStarted {
        request_id: String,
        model: String,
    },

    /// A streaming response chunk was received
    StreamChunk {
        request_id: String,
        chunk: String,
    },

    /// A streaming response ended
    StreamEnded {
        request_id: String,
        fragments: usize,
    },

    /// A streaming response was interrupted
    StreamFailed {
        request_id: String,
        error: String,
    },

    /// The catalog was written to disk
    CatalogExported {
        path: String,
    },

    /// An error occurred
    Error {
        error: String,
    },

    /// Application is shutting down
    Shutdown,
}
