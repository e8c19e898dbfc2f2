//! Tool trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Definition of a tool as presented to the language model
///
/// The driver sends these alongside the chat history so the model can decide
/// which tool to request next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name the model calls it by
    pub name: String,
    /// Description that helps the model decide when to use the tool
    pub description: String,
    /// JSON Schema for the tool's input
    pub input_schema: Value,
}

/// Build the input schema for a tool taking one string argument
///
/// Every tool in this workspace takes exactly one string argument (a company
/// name, a ticker, or a search query), so the schema shape is shared.
pub fn string_argument_schema(argument: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            argument: {
                "type": "string",
                "description": description,
            }
        },
        "required": [argument]
    })
}

/// Trait for callables exposed to the language model
///
/// Tools take a single string argument and return human-readable text on both
/// success and failure. Errors never cross this boundary: a tool that fails
/// describes the failure in its returned text so the model can relay or act
/// on the explanation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invoke the tool with its single string argument
    async fn invoke(&self, argument: &str) -> String;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry and match the name in ToolDefinition
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;

    /// Build the model-facing definition for this tool
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
