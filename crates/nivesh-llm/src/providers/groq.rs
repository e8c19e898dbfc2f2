//! Groq provider implementation
//!
//! Implements the [`LlmProvider`] trait against Groq's OpenAI-compatible
//! chat-completions API. See: https://console.groq.com/docs/api-reference
//!
//! Because the wire format is the OpenAI one, the provider also works with
//! other compatible deployments (vLLM, LM Studio, Azure) through a custom
//! `api_base`.

use crate::{
    CompletionRequest, CompletionResponse, FunctionCall, FunctionSpec, LlmError, LlmProvider,
    Message, Result, Role, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Groq provider
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.groq.com/openai/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GroqConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GROQ_API_KEY` and, optionally, the base URL
    /// from `GROQ_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            LlmError::ConfigurationError("GROQ_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("GROQ_API_BASE").unwrap_or_else(|_| DEFAULT_GROQ_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Groq provider
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
}

impl GroqProvider {
    /// Create a new Groq provider with custom configuration
    pub fn with_config(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new Groq provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GroqConfig::new(api_key))
    }

    /// Create a provider from the `GROQ_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        Self::with_config(GroqConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GroqConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Groq API at {}", self.config.api_base);

        let wire_request = build_wire_request(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimitExceeded(error_text),
                400 => LlmError::InvalidRequest(error_text),
                404 => LlmError::ModelNotFound(request.model),
                _ => LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let wire_response: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let choice = wire_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse("No choices in response".to_string()))?;

        debug!(
            "Received response - finish_reason: {}, tokens: {}/{}",
            choice.finish_reason,
            wire_response.usage.prompt_tokens,
            wire_response.usage.completion_tokens
        );

        let calls = parse_tool_calls(choice.message.tool_calls)?;

        Ok(CompletionResponse {
            content: choice.message.content.filter(|c| !c.is_empty()),
            calls,
            usage: TokenUsage {
                input_tokens: wire_response.usage.prompt_tokens,
                output_tokens: wire_response.usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

// ============================================================================
// Wire types (OpenAI-compatible)
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_wire_request(request: &CompletionRequest) -> WireRequest {
    let mut messages = Vec::new();

    // System prompt goes into the messages array for OpenAI-compatible APIs
    if let Some(sys) = &request.system {
        messages.push(WireMessage {
            role: "system".to_string(),
            content: sys.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(convert_message(msg));
    }

    let tools = request
        .functions
        .as_ref()
        .map(|specs| specs.iter().map(convert_function).collect());

    let tool_choice = match (&request.forced_function, &request.functions) {
        (Some(name), _) => Some(json!({"type": "function", "function": {"name": name}})),
        (None, Some(_)) => Some(json!("auto")),
        (None, None) => None,
    };

    WireRequest {
        model: request.model.clone(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools,
        tool_choice,
    }
}

fn convert_message(msg: &Message) -> WireMessage {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    WireMessage {
        role: role.to_string(),
        content: msg.content.clone(),
    }
}

fn convert_function(spec: &FunctionSpec) -> WireTool {
    WireTool {
        tool_type: "function".to_string(),
        function: WireFunction {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        },
    }
}

/// Parse tool calls, decoding each call's JSON-string arguments
fn parse_tool_calls(calls: Option<Vec<WireToolCall>>) -> Result<Vec<FunctionCall>> {
    let Some(calls) = calls else {
        return Ok(Vec::new());
    };

    calls
        .into_iter()
        .map(|call| {
            let arguments: Value = serde_json::from_str(&call.function.arguments)
                .map_err(|e| {
                    LlmError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
                })?;

            Ok(FunctionCall {
                name: call.function.name,
                arguments,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = GroqProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.config().api_key, "test-key");
        assert_eq!(provider.config().api_base, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_provider_with_custom_config() {
        let config = GroqConfig::new("test-key")
            .with_api_base("http://localhost:8000/v1")
            .with_timeout(60);

        let provider = GroqProvider::with_config(config).unwrap();
        assert_eq!(provider.config().api_base, "http://localhost:8000/v1");
        assert_eq!(provider.config().timeout_secs, 60);
    }

    #[test]
    fn test_forced_function_tool_choice() {
        let spec = FunctionSpec {
            name: "record_ticker".to_string(),
            description: "Record the ticker".to_string(),
            parameters: json!({"type": "object"}),
        };

        let request = CompletionRequest::builder("test-model")
            .add_message(Message::user("extract"))
            .functions(vec![spec])
            .force_function("record_ticker")
            .build();

        let wire = build_wire_request(&request);
        assert_eq!(
            wire.tool_choice,
            Some(json!({"type": "function", "function": {"name": "record_ticker"}}))
        );
        assert_eq!(wire.tools.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_system_message_in_array() {
        let request = CompletionRequest::builder("test-model")
            .system("You are helpful")
            .add_message(Message::user("hi"))
            .build();

        let wire = build_wire_request(&request);
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content, "You are helpful");
        assert_eq!(wire.messages[1].role, "user");
        assert!(wire.tool_choice.is_none());
    }

    #[test]
    fn test_parse_tool_calls() {
        let calls = vec![WireToolCall {
            function: WireFunctionCall {
                name: "record_ticker".to_string(),
                arguments: r#"{"company_symbol":"RELIANCE"}"#.to_string(),
            },
        }];

        let parsed = parse_tool_calls(Some(calls)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "record_ticker");
        assert_eq!(parsed[0].arguments["company_symbol"], "RELIANCE");
    }

    #[test]
    fn test_parse_malformed_tool_arguments() {
        let calls = vec![WireToolCall {
            function: WireFunctionCall {
                name: "record_ticker".to_string(),
                arguments: "not json".to_string(),
            },
        }];

        let result = parse_tool_calls(Some(calls));
        assert!(matches!(result, Err(LlmError::UnexpectedResponse(_))));
    }
}
