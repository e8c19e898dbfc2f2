//! Structured final report
//!
//! Turns the consolidated corpus into a pros/cons outline through one forced
//! function call, so the driver gets fields to render instead of free text.

use crate::config::AnalysisConfig;
use crate::error::Result;
use nivesh_llm::{FunctionSpec, LlmProvider, StructuredExtractor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// The structured summary of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutline {
    /// A short summary of the company / business in question
    pub company_summary: String,
    /// A detailed list of pros of the company, based on the analysis
    pub pros: String,
    /// A detailed list of cons of the company, based on the analysis
    pub cons: String,
    /// Additional notes based on the analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl fmt::Display for ReportOutline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "## Company summary\n{}\n\n## Pros\n{}\n\n## Cons\n{}",
            self.company_summary, self.pros, self.cons
        )?;
        if let Some(additional) = &self.additional_info {
            write!(f, "\n\n## Additional notes\n{additional}")?;
        }
        Ok(())
    }
}

/// Generates report outlines from consolidated corpora
pub struct ReportGenerator {
    llm: Arc<dyn LlmProvider>,
    config: Arc<AnalysisConfig>,
}

impl ReportGenerator {
    /// Create a new generator
    pub fn new(llm: Arc<dyn LlmProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { llm, config }
    }

    /// Summarize a consolidated corpus into a report outline
    #[instrument(skip(self, corpus))]
    pub async fn summarize(&self, corpus: &str) -> Result<ReportOutline> {
        let prompt = format!(
            "You are an experienced equity research analyst. Based only on the company \
             analysis below, record a short company summary, a detailed list of pros, a \
             detailed list of cons, and any additional notes.\n\n{corpus}"
        );

        let outline = StructuredExtractor::new(self.llm.as_ref(), &self.config.model)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .extract(prompt, outline_spec())
            .await?;

        Ok(outline)
    }
}

fn outline_spec() -> FunctionSpec {
    FunctionSpec {
        name: "record_report".to_string(),
        description: "Record the structured analysis report".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "company_summary": {
                    "type": "string",
                    "description": "A short summary of the company / business in question"
                },
                "pros": {
                    "type": "string",
                    "description": "A detailed list of pros of the company, based on the analysis"
                },
                "cons": {
                    "type": "string",
                    "description": "A detailed list of cons of the company, based on the analysis"
                },
                "additional_info": {
                    "type": "string",
                    "description": "Additional notes based on the analysis"
                }
            },
            "required": ["company_summary", "pros", "cons"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nivesh_llm::{
        CompletionRequest, CompletionResponse, FunctionCall, LlmError, TokenUsage,
    };

    struct OutliningLlm;

    #[async_trait]
    impl LlmProvider for OutliningLlm {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            assert_eq!(request.forced_function.as_deref(), Some("record_report"));
            Ok(CompletionResponse {
                content: None,
                calls: vec![FunctionCall {
                    name: "record_report".to_string(),
                    arguments: json!({
                        "company_summary": "Large diversified conglomerate.",
                        "pros": "- Strong revenue growth",
                        "cons": "- High leverage"
                    }),
                }],
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 10,
                },
            })
        }

        fn name(&self) -> &str {
            "outlining"
        }
    }

    #[tokio::test]
    async fn test_summarize_returns_outline() {
        let generator = ReportGenerator::new(
            Arc::new(OutliningLlm),
            Arc::new(AnalysisConfig::default()),
        );

        let outline = generator.summarize("corpus text").await.unwrap();
        assert_eq!(outline.company_summary, "Large diversified conglomerate.");
        assert!(outline.additional_info.is_none());
    }

    #[test]
    fn test_display_renders_sections() {
        let outline = ReportOutline {
            company_summary: "Summary".to_string(),
            pros: "- pro".to_string(),
            cons: "- con".to_string(),
            additional_info: Some("note".to_string()),
        };

        let rendered = outline.to_string();
        assert!(rendered.starts_with("## Company summary\nSummary"));
        assert!(rendered.contains("## Pros\n- pro"));
        assert!(rendered.contains("## Cons\n- con"));
        assert!(rendered.ends_with("## Additional notes\nnote"));
    }
}
