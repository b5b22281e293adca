//! LLM provider abstractions and implementations
//!
//! This module provides a unified interface for talking to the Gemini
//! generation API, with support for streaming responses, retries and an
//! offline simulated provider when no API key is configured.

pub mod provider;
pub mod types;
pub mod gemini;
pub mod simulated;
pub mod errors;

#[cfg(test)]
pub mod mock;

pub use provider::*;
pub use types::*;
pub use errors::*;
