//! Inference engine adapters.
//!
//! The engine is an opaque collaborator: given a prompt and generation
//! parameters it returns text or fails. Whether that text repeats the prompt
//! is a property of the adapter, declared through
//! [`InferenceEngine::echoes_prompt`] and undone by [`completion_text`].
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod client;

pub use client::HttpEngine;

use crate::error::InferenceError;
use async_trait::async_trait;

/// Parameters for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Client length budget, sent upstream as the new-token limit
    /// (capped by `engine.max_new_tokens_cap`).
    pub max_length: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &str;

    /// Whether raw output starts with the literal prompt text.
    fn echoes_prompt(&self) -> bool {
        false
    }

    /// Produce raw generated text for `prompt`.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, InferenceError>;
}

/// Turn raw engine output into the completion returned to clients.
///
/// For echoing engines exactly `prompt`'s length in characters is removed
/// from the front. This is positional, not a prefix match: an engine that
/// declares echoing but does not echo loses the start of its output. The
/// remainder is trimmed of surrounding whitespace in all cases.
pub fn completion_text(echoes_prompt: bool, prompt: &str, raw: &str) -> String {
    let body = if echoes_prompt {
        match raw.char_indices().nth(prompt.chars().count()) {
            Some((offset, _)) => &raw[offset..],
            None => "",
        }
    } else {
        raw
    };
    body.trim().to_string()
}
