//! Error types for the analysis pipeline

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Analysis pipeline errors
///
/// Most of these never reach a caller as errors: the tool boundary converts
/// everything to descriptive text. They exist so the conversion sites have
/// something precise to describe.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Company name failed the input pattern, rejected before any I/O
    #[error("Invalid company name: {0:?}")]
    InvalidCompanyName(String),

    /// The model's extraction did not yield a plausible ticker symbol
    #[error("Could not identify a ticker symbol in the search results")]
    NoTickerFound,

    /// Web search failed
    #[error("Search error: {0}")]
    Search(String),

    /// Financial data provider failed
    #[error("Data provider error: {0}")]
    Provider(String),

    /// Required line item or info key is missing from provider data
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(#[from] nivesh_llm::LlmError),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
