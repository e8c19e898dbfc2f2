//! Tool registry for managing available tools

use crate::error::{Error, Result};
use crate::tool::{Tool, ToolDefinition};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry for managing tools
///
/// The conversational driver looks tools up by the name the model requested
/// and dispatches the call. Dispatch never surfaces a tool failure; only an
/// unknown name is an error.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap();
        tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap();
        tools.get(name).cloned()
    }

    /// Invoke a registered tool by name
    pub async fn dispatch(&self, name: &str, argument: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        Ok(tool.invoke(argument).await)
    }

    /// Build the definitions of all registered tools
    ///
    /// This is what the driver hands to the LLM so it can request tool calls.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().unwrap();
        tools.values().map(|t| t.definition()).collect()
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap();
        tools.values().cloned().collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap();
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        let tools = self.tools.read().unwrap();
        tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::string_argument_schema;
    use async_trait::async_trait;
    use serde_json::Value;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        async fn invoke(&self, argument: &str) -> String {
            argument.to_uppercase()
        }

        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the argument"
        }

        fn input_schema(&self) -> Value {
            string_argument_schema("text", "Text to uppercase")
        }
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool));

        assert_eq!(registry.len(), 1);
        let out = registry.dispatch("upper", "tcs").await.unwrap();
        assert_eq!(out, "TCS");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.dispatch("missing", "x").await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[test]
    fn test_definitions() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool));

        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "upper");
    }
}
