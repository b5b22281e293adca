use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::{thread, time::Duration};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::{GenerationOutcome, RequestToken};

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// A one-shot generation came back
    GenerationFinished(GenerationOutcome),

    /// One fragment of a streaming chat reply
    ChatFragment { token: RequestToken, fragment: String },

    /// A streaming chat reply ended
    ChatFinished(RequestToken),
}

/// Event handler for managing input events
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler that polls the terminal every `tick_interval`
    pub fn new(tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let input_sender = sender.clone();
        thread::spawn(move || loop {
            let event = match crossterm::event::poll(tick_interval) {
                Ok(true) => match crossterm::event::read() {
                    Ok(event) => Self::convert_crossterm_event(event),
                    Err(e) => {
                        debug!("Terminal read failed: {}", e);
                        None
                    }
                },
                Ok(false) => Some(Event::Tick),
                Err(e) => {
                    debug!("Terminal poll failed: {}", e);
                    break;
                }
            };
            if let Some(event) = event {
                if input_sender.send(event).is_err() {
                    break;
                }
            }
        });

        Self { receiver, sender }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Convert crossterm events to application events
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
            CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
