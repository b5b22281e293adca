//! Shared helpers for the CLI and the interactive UI

pub mod clipboard;
pub mod text;
