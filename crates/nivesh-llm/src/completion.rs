//! Completion request and response types

use crate::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the model may call, in JSON Schema form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name the model calls it by
    pub name: String,
    /// Description that tells the model what the function records
    pub description: String,
    /// JSON Schema of the function's arguments
    pub parameters: Value,
}

/// Request for a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation history
    pub messages: Vec<Message>,

    /// Optional system prompt, prepended to the conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Functions available for the model to call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,

    /// Name of the function the model MUST call
    ///
    /// When set, the provider forces the tool choice so the response carries
    /// exactly one structured call instead of free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_function: Option<String>,
}

impl CompletionRequest {
    /// Create a builder for completion requests
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for CompletionRequest
pub struct CompletionRequestBuilder {
    model: String,
    messages: Vec<Message>,
    system: Option<String>,
    max_tokens: usize,
    temperature: Option<f32>,
    functions: Option<Vec<FunctionSpec>>,
    forced_function: Option<String>,
}

impl CompletionRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: 1024,
            temperature: None,
            functions: None,
            forced_function: None,
        }
    }

    /// Add a single message
    pub fn add_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the available functions
    pub fn functions(mut self, functions: Vec<FunctionSpec>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Force the model to call the named function
    ///
    /// The function must also be present in `functions`.
    pub fn force_function(mut self, name: impl Into<String>) -> Self {
        self.forced_function = Some(name.into());
        self
    }

    /// Build the completion request
    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            model: self.model,
            messages: self.messages,
            system: self.system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            functions: self.functions,
            forced_function: self.forced_function,
        }
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the requested function
    pub name: String,
    /// Parsed call arguments
    pub arguments: Value,
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Free-text content, if the model produced any
    pub content: Option<String>,

    /// Function calls requested by the model
    pub calls: Vec<FunctionCall>,

    /// Token usage statistics
    pub usage: TokenUsage,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}
