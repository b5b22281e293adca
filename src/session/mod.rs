//! Session state and conversation handling
//!
//! This module owns the interactive session: which section and item are
//! active, the playground panel, and the chat history it streams into.

mod conversation;
mod controller;

pub use conversation::*;
pub use controller::*;
