//! Generative-text backend.
//!
//! Stages talk to the backend only through [`TextGenerator`], so the
//! Coordinator can run against the real client or a scripted double.

#[cfg(feature = "http")]
mod openai;
mod types;

#[cfg(feature = "http")]
pub use openai::OpenAiClient;
pub use types::{ChatMessage, GenerationRequest, GenerationResponse, MessageRole};

use crate::errors::GenerationError;
use async_trait::async_trait;

/// A request/response text-completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}
