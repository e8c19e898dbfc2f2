//! LLM provider layer for nivesh
//!
//! A small abstraction over chat-completion APIs, sized for what the analysis
//! pipeline actually needs:
//!
//! - [`LlmProvider`]: the provider trait ([`providers::GroqProvider`] is the
//!   shipped implementation, pointed at Groq's OpenAI-compatible endpoint)
//! - [`CompletionRequest`]/[`CompletionResponse`]: chat messages plus optional
//!   function specs the model may call
//! - [`StructuredExtractor`]: forces a single function call and deserializes
//!   its arguments into a typed value, used for ticker extraction and the
//!   final report outline

pub mod completion;
pub mod error;
pub mod extract;
pub mod messages;
pub mod provider;
pub mod providers;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, FunctionCall, FunctionSpec,
    TokenUsage,
};
pub use error::{LlmError, Result};
pub use extract::StructuredExtractor;
pub use messages::{Message, Role};
pub use provider::LlmProvider;
