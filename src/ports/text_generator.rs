//! Text generator port for hosted language models.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::SlideError;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash-lite-preview-06-17"`).
    pub model: String,
    /// The full prompt, sent as the only content part.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

/// The provider's reply, reduced to its first text segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    /// Raw text of the first candidate's first part. Empty when the reply had none.
    pub text: String,
}

/// Boxed future type returned by [`TextGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TextResponse, SlideError>> + Send + 'a>>;

/// Generates free text from a prompt via an external API.
pub trait TextGenerator: Send + Sync {
    /// Run one completion. Called at most once per request; no retries.
    fn generate(&self, request: &TextRequest) -> GenerateFuture<'_>;
}
