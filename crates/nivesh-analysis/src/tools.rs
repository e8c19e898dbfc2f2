//! Model-facing tools
//!
//! Each tool wraps one component behind the string-in/string-out boundary the
//! conversational driver dispatches through. Failures are always described in
//! the returned text, never raised.

use crate::api::nse::SymbolListing;
use crate::api::search::{WebSearch, render_hits};
use crate::api::yahoo::QuoteProvider;
use crate::config::AnalysisConfig;
use crate::fundamentals::FundamentalsExtractor;
use crate::news::NewsRetriever;
use crate::pipeline::AnalysisPipeline;
use crate::stock_info::StockInfoFormatter;
use async_trait::async_trait;
use nivesh_core::{Tool, ToolRegistry, string_argument_schema};
use nivesh_llm::LlmProvider;
use serde_json::Value;
use std::sync::Arc;

/// Composite analysis tool: resolve a company, gather everything, return the
/// consolidated corpus
pub struct AnalyseCompanyTool {
    pipeline: Arc<AnalysisPipeline>,
}

impl AnalyseCompanyTool {
    /// Create the tool around a wired pipeline
    pub fn new(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Tool for AnalyseCompanyTool {
    async fn invoke(&self, argument: &str) -> String {
        self.pipeline.analyse_company(argument).await
    }

    fn name(&self) -> &str {
        "analyse_company"
    }

    fn description(&self) -> &str {
        "Perform a full analysis of the company named in the input: resolves the NSE \
         ticker, then gathers fundamental analysis, stock info, financial statements, \
         and recent news into one report."
    }

    fn input_schema(&self) -> Value {
        string_argument_schema("company_name", "The name of the company to analyse")
    }
}

/// Fundamental-analysis tool for an already-resolved ticker
pub struct FundamentalAnalysisTool {
    extractor: FundamentalsExtractor,
}

impl FundamentalAnalysisTool {
    /// Create the tool from the data-provider capability
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self {
            extractor: FundamentalsExtractor::new(provider, config),
        }
    }
}

#[async_trait]
impl Tool for FundamentalAnalysisTool {
    async fn invoke(&self, argument: &str) -> String {
        self.extractor.analyze(argument).await
    }

    fn name(&self) -> &str {
        "fundamental_analysis"
    }

    fn description(&self) -> &str {
        "Perform a comprehensive fundamental analysis on the given stock ticker: \
         key ratios, growth rates, valuation metrics, future estimates, a simple DCF \
         valuation, and qualitative interpretations."
    }

    fn input_schema(&self) -> Value {
        string_argument_schema("ticker", "The ticker/trading symbol of the company")
    }
}

/// Stock info and analyst-recommendations tool
pub struct StockInfoTool {
    formatter: StockInfoFormatter,
}

impl StockInfoTool {
    /// Create the tool from the data-provider capability
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self {
            formatter: StockInfoFormatter::new(provider, config),
        }
    }
}

#[async_trait]
impl Tool for StockInfoTool {
    async fn invoke(&self, argument: &str) -> String {
        self.formatter.format(argument).await
    }

    fn name(&self) -> &str {
        "stock_info"
    }

    fn description(&self) -> &str {
        "Provide detailed financial and general information about the stock ticker, \
         plus a table of analyst recommendations."
    }

    fn input_schema(&self) -> Value {
        string_argument_schema("ticker", "The ticker/trading symbol of the company")
    }
}

/// Recent-news tool
pub struct RecentNewsTool {
    retriever: NewsRetriever,
}

impl RecentNewsTool {
    /// Create the tool from the search capability
    pub fn new(search: Arc<dyn WebSearch>, config: Arc<AnalysisConfig>) -> Self {
        Self {
            retriever: NewsRetriever::new(search, config),
        }
    }
}

#[async_trait]
impl Tool for RecentNewsTool {
    async fn invoke(&self, argument: &str) -> String {
        self.retriever.fetch(argument).await
    }

    fn name(&self) -> &str {
        "recent_news"
    }

    fn description(&self) -> &str {
        "Get recent news articles for the given stock ticker, with titles, article \
         snippets, and source URLs."
    }

    fn input_schema(&self) -> Value {
        string_argument_schema("ticker", "The ticker/trading symbol of the company")
    }
}

/// Generic web-search tool
pub struct WebSearchTool {
    search: Arc<dyn WebSearch>,
    config: Arc<AnalysisConfig>,
}

impl WebSearchTool {
    /// Create the tool from the search capability
    pub fn new(search: Arc<dyn WebSearch>, config: Arc<AnalysisConfig>) -> Self {
        Self { search, config }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn invoke(&self, argument: &str) -> String {
        match self
            .search
            .search(
                argument,
                &self.config.search_region,
                self.config.search_max_results,
            )
            .await
        {
            Ok(hits) => render_hits(&hits),
            Err(e) => format!("An error occurred during the search: {e}"),
        }
    }

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Get web search results for a query, with titles, body snippets, and source URLs."
    }

    fn input_schema(&self) -> Value {
        string_argument_schema("query", "Search query to be executed")
    }
}

/// Build the full tool registry the conversational driver dispatches through
pub fn build_registry(
    search: Arc<dyn WebSearch>,
    provider: Arc<dyn QuoteProvider>,
    listing: Arc<dyn SymbolListing>,
    llm: Arc<dyn LlmProvider>,
    config: Arc<AnalysisConfig>,
) -> ToolRegistry {
    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::clone(&search),
        Arc::clone(&provider),
        listing,
        llm,
        Arc::clone(&config),
    ));

    let registry = ToolRegistry::new();
    registry.register(Arc::new(AnalyseCompanyTool::new(pipeline)));
    registry.register(Arc::new(FundamentalAnalysisTool::new(
        Arc::clone(&provider),
        Arc::clone(&config),
    )));
    registry.register(Arc::new(StockInfoTool::new(
        provider,
        Arc::clone(&config),
    )));
    registry.register(Arc::new(RecentNewsTool::new(
        Arc::clone(&search),
        Arc::clone(&config),
    )));
    registry.register(Arc::new(WebSearchTool::new(search, config)));
    registry
}
