//! Structured extraction via forced function calling
//!
//! The pipeline needs the model to answer in a machine-readable shape twice:
//! once to pull a ticker symbol out of raw search results, and once to turn
//! the consolidated corpus into a report outline. Both go through
//! [`StructuredExtractor`], which forces a single function call and
//! deserializes its arguments.

use crate::{
    CompletionRequest, FunctionSpec, LlmError, LlmProvider, Message, Result,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Runs single-shot structured extractions against a provider
pub struct StructuredExtractor<'a> {
    provider: &'a dyn LlmProvider,
    model: &'a str,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl<'a> StructuredExtractor<'a> {
    /// Create an extractor bound to a provider and model
    pub fn new(provider: &'a dyn LlmProvider, model: &'a str) -> Self {
        Self {
            provider,
            model,
            max_tokens: 1024,
            temperature: None,
        }
    }

    /// Set the maximum tokens for the extraction call
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extract a `T` from the prompt by forcing a call to `spec`
    ///
    /// This is a single extraction call, not an iterative loop. If the model
    /// returns free text instead of the forced call, the text is tried as a
    /// JSON fallback before giving up.
    pub async fn extract<T: DeserializeOwned>(
        &self,
        prompt: impl Into<String>,
        spec: FunctionSpec,
    ) -> Result<T> {
        let function_name = spec.name.clone();

        let mut builder = CompletionRequest::builder(self.model)
            .add_message(Message::user(prompt))
            .max_tokens(self.max_tokens)
            .functions(vec![spec])
            .force_function(&function_name);
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self.provider.complete(builder.build()).await?;

        if let Some(call) = response
            .calls
            .iter()
            .find(|call| call.name == function_name)
        {
            return Ok(serde_json::from_value(call.arguments.clone())?);
        }

        // Some models answer inline despite the forced tool choice
        if let Some(content) = &response.content {
            debug!("No function call in response, trying content as JSON");
            if let Ok(value) = serde_json::from_str::<T>(content) {
                return Ok(value);
            }
        }

        Err(LlmError::ExtractionFailed(format!(
            "model did not call {function_name}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionResponse, FunctionCall, TokenUsage};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct TickerOut {
        company_symbol: String,
    }

    struct CannedProvider {
        response: CompletionResponse,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(self.response.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn spec() -> FunctionSpec {
        FunctionSpec {
            name: "record_ticker".to_string(),
            description: "Record the ticker".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"company_symbol": {"type": "string"}},
                "required": ["company_symbol"]
            }),
        }
    }

    fn usage() -> TokenUsage {
        TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        }
    }

    #[tokio::test]
    async fn test_extract_from_function_call() {
        let provider = CannedProvider {
            response: CompletionResponse {
                content: None,
                calls: vec![FunctionCall {
                    name: "record_ticker".to_string(),
                    arguments: json!({"company_symbol": "TCS"}),
                }],
                usage: usage(),
            },
        };

        let out: TickerOut = StructuredExtractor::new(&provider, "test-model")
            .extract("extract", spec())
            .await
            .unwrap();
        assert_eq!(out.company_symbol, "TCS");
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_content_json() {
        let provider = CannedProvider {
            response: CompletionResponse {
                content: Some(r#"{"company_symbol": "INFY"}"#.to_string()),
                calls: Vec::new(),
                usage: usage(),
            },
        };

        let out: TickerOut = StructuredExtractor::new(&provider, "test-model")
            .extract("extract", spec())
            .await
            .unwrap();
        assert_eq!(out.company_symbol, "INFY");
    }

    #[tokio::test]
    async fn test_extract_fails_without_call_or_json() {
        let provider = CannedProvider {
            response: CompletionResponse {
                content: Some("I could not find a symbol".to_string()),
                calls: Vec::new(),
                usage: usage(),
            },
        };

        let result: Result<TickerOut> = StructuredExtractor::new(&provider, "test-model")
            .extract("extract", spec())
            .await;
        assert!(matches!(result, Err(LlmError::ExtractionFailed(_))));
    }
}
