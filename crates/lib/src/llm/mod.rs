//! Completion backend abstraction and Gemini client.
//!
//! The relay only needs one operation from a language model: turn a prompt into text.

mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion returned no text")]
    EmptyResponse,
}

/// Generates text for a prompt. Implemented by [`GeminiClient`]; tests inject stubs.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError>;
}
