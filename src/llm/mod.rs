//! Language-model completion
//!
//! [`Completer`] is the only surface the answer pipeline depends on;
//! [`LlmService`] implements it against an OpenAI-compatible
//! chat-completions endpoint.

pub mod client;

use async_trait::async_trait;
pub use client::LlmService;

use crate::errors::Result;
use crate::models::ComposedPrompt;

/// Sampling controls for one completion call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Sends a composed prompt to a language model and returns the generated text.
///
/// Any transport or service failure (rate limit, timeout, malformed response,
/// rejected credential) is reported as an error; the caller decides how to
/// surface it.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &ComposedPrompt, params: SamplingParams) -> Result<String>;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}
