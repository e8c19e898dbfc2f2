//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations of this trait provide access to chat-completion services.
/// The shipped implementation targets Groq's OpenAI-compatible API; tests
/// substitute canned providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages, functions, and parameters
    ///
    /// # Returns
    ///
    /// The completion response with text content and/or requested function calls
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "groq")
    fn name(&self) -> &str;
}
