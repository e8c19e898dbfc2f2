//! Equity-analysis pipeline for NSE/BSE-listed stocks
//!
//! This crate is the core of nivesh: it takes a free-text company query and
//! drives a fixed retrieval pipeline behind a language model's tool calls:
//!
//! 1. Resolve the company name to an exchange ticker (web search + model
//!    extraction + cross-check against the NSE equity listing)
//! 2. Fundamental analysis (ratios, growth, valuation, simplified DCF)
//! 3. Stock info snapshot and analyst recommendations
//! 4. Financial statements in crores
//! 5. Recent news
//!
//! Downstream steps only run with a validated ticker; rejection short-circuits
//! the run. Every model-facing entry point returns text on both success and
//! failure, so errors never cross the tool boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use nivesh_analysis::{AnalysisConfig, AnalysisPipeline};
//! use nivesh_analysis::api::{DuckDuckGoClient, NseListingClient, YahooFinanceClient};
//! use nivesh_llm::providers::GroqProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(AnalysisConfig::default().with_env_model());
//!     let timeout = config.request_timeout;
//!
//!     let pipeline = AnalysisPipeline::new(
//!         Arc::new(DuckDuckGoClient::new(timeout)?),
//!         Arc::new(YahooFinanceClient::new(timeout)?),
//!         Arc::new(NseListingClient::new(timeout)?),
//!         Arc::new(GroqProvider::from_env()?),
//!         config,
//!     );
//!
//!     let corpus = pipeline.analyse_company("How is Reliance performing?").await;
//!     println!("{corpus}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fin;
pub mod fundamentals;
pub mod news;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod statements;
pub mod stock_info;
pub mod symbol;
pub mod tools;

// Re-export main types for convenience
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use fundamentals::{FundamentalAnalysis, FundamentalsExtractor};
pub use news::NewsRetriever;
pub use pipeline::{AnalysisPipeline, PipelineStage};
pub use report::{ReportGenerator, ReportOutline};
pub use resolver::{Resolution, TickerResolver};
pub use statements::StatementFormatter;
pub use stock_info::StockInfoFormatter;
pub use symbol::{CompanyQuery, ResolvedTicker};
pub use tools::build_registry;
