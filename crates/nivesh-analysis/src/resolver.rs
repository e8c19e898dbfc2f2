//! Ticker resolution
//!
//! Turns a validated company name into a validated exchange ticker: search
//! the web for the symbol, have the model extract it in a constrained shape,
//! then cross-check against the authoritative NSE listing. Rejection is an
//! expected outcome carried as a value, not an error, so the orchestrator can
//! hand the message straight back to the model.

use crate::api::nse::SymbolListing;
use crate::api::search::{WebSearch, render_hits};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::symbol::{CompanyQuery, ResolvedTicker};
use nivesh_llm::{FunctionSpec, LlmProvider, StructuredExtractor};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Fixed rejection message for symbols absent from the NSE listing
pub const NSE_REJECTION: &str = "The ticker is not a part of NSE India";

/// Rejection message when extraction yields nothing ticker-shaped
pub const NO_TICKER_REJECTION: &str =
    "Could not identify a ticker symbol for the company in the search results";

/// Outcome of a resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Symbol validated (or validation unavailable and skipped)
    Validated(ResolvedTicker),
    /// Resolution rejected with a user-facing message; the pipeline
    /// short-circuits and no further steps run
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct TickerExtraction {
    company_symbol: String,
}

/// Resolves company names to validated NSE tickers
pub struct TickerResolver {
    search: Arc<dyn WebSearch>,
    listing: Arc<dyn SymbolListing>,
    llm: Arc<dyn LlmProvider>,
    config: Arc<AnalysisConfig>,
}

impl TickerResolver {
    /// Create a new resolver
    pub fn new(
        search: Arc<dyn WebSearch>,
        listing: Arc<dyn SymbolListing>,
        llm: Arc<dyn LlmProvider>,
        config: Arc<AnalysisConfig>,
    ) -> Self {
        Self {
            search,
            listing,
            llm,
            config,
        }
    }

    /// Resolve a validated company name to a ticker
    ///
    /// The symbol is resolved once and reused by every downstream step;
    /// nothing re-derives it mid-pipeline.
    #[instrument(skip(self), fields(company = %company))]
    pub async fn resolve(&self, company: &CompanyQuery) -> Result<Resolution> {
        let hits = self
            .search
            .search(
                &format!("What is the NSE ticker symbol for {company}"),
                &self.config.search_region,
                self.config.search_max_results,
            )
            .await?;

        let extraction: TickerExtraction =
            StructuredExtractor::new(self.llm.as_ref(), &self.config.model)
                .max_tokens(self.config.max_tokens)
                .temperature(self.config.temperature)
                .extract(extraction_prompt(&render_hits(&hits)), extraction_spec())
                .await?;

        debug!("extracted candidate symbol {:?}", extraction.company_symbol);

        let ticker = match ResolvedTicker::parse(&extraction.company_symbol) {
            Ok(ticker) => ticker,
            Err(AnalysisError::NoTickerFound) => {
                info!("extraction produced no ticker-shaped symbol, rejecting");
                return Ok(Resolution::Rejected(NO_TICKER_REJECTION.to_string()));
            }
            Err(e) => return Err(e),
        };

        // Cross-check against the authoritative listing; a missing listing
        // skips validation (fail-open), it never rejects on its own
        match self.listing.symbols().await {
            Some(symbols) if !symbols.contains(ticker.symbol()) => {
                info!("symbol {} not in NSE listing, rejecting", ticker);
                Ok(Resolution::Rejected(NSE_REJECTION.to_string()))
            }
            Some(_) => Ok(Resolution::Validated(ticker)),
            None => {
                warn!("NSE listing unavailable, accepting {} unvalidated", ticker);
                Ok(Resolution::Validated(ticker))
            }
        }
    }
}

fn extraction_prompt(search_results: &str) -> String {
    format!(
        "Extract the ticker / company symbol from the input search result :\n{search_results}"
    )
}

fn extraction_spec() -> FunctionSpec {
    FunctionSpec {
        name: "record_ticker".to_string(),
        description: "Record the company symbol extracted from the search results".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "company_symbol": {
                    "type": "string",
                    "description": "Company symbol from NSE/BSE, should only contain capital letters."
                }
            },
            "required": ["company_symbol"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::nse::MockSymbolListing;
    use crate::api::search::{MockWebSearch, SearchHit};
    use async_trait::async_trait;
    use nivesh_llm::{
        CompletionRequest, CompletionResponse, FunctionCall, LlmError, TokenUsage,
    };
    use std::collections::HashSet;

    struct StubLlm {
        symbol: String,
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: None,
                calls: vec![FunctionCall {
                    name: "record_ticker".to_string(),
                    arguments: json!({"company_symbol": self.symbol.clone()}),
                }],
                usage: TokenUsage {
                    input_tokens: 1,
                    output_tokens: 1,
                },
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn search_with_hits() -> MockWebSearch {
        let mut search = MockWebSearch::new();
        search.expect_search().returning(|_, _, _| {
            Ok(vec![SearchHit {
                title: "Reliance Industries share price NSE".to_string(),
                body: "RELIANCE quote on the National Stock Exchange".to_string(),
                href: "https://www.nseindia.com/quote?symbol=RELIANCE".to_string(),
            }])
        });
        search
    }

    fn listing_with(symbols: &[&str]) -> MockSymbolListing {
        let set: HashSet<String> = symbols.iter().map(ToString::to_string).collect();
        let mut listing = MockSymbolListing::new();
        listing
            .expect_symbols()
            .returning(move || Some(set.clone()));
        listing
    }

    fn resolver(
        search: MockWebSearch,
        listing: MockSymbolListing,
        symbol: &str,
    ) -> TickerResolver {
        TickerResolver::new(
            Arc::new(search),
            Arc::new(listing),
            Arc::new(StubLlm {
                symbol: symbol.to_string(),
            }),
            Arc::new(AnalysisConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_symbol_in_listing_validates() {
        let resolver = resolver(
            search_with_hits(),
            listing_with(&["RELIANCE", "TCS"]),
            "RELIANCE",
        );

        let query = CompanyQuery::parse("Reliance").unwrap();
        let resolution = resolver.resolve(&query).await.unwrap();
        match resolution {
            Resolution::Validated(ticker) => assert_eq!(ticker.symbol(), "RELIANCE"),
            Resolution::Rejected(msg) => panic!("unexpected rejection: {msg}"),
        }
    }

    #[tokio::test]
    async fn test_symbol_absent_rejects_with_fixed_message() {
        let resolver = resolver(search_with_hits(), listing_with(&["TCS"]), "XYZQX");

        let query = CompanyQuery::parse("XYZQX stock").unwrap();
        let resolution = resolver.resolve(&query).await.unwrap();
        assert_eq!(resolution, Resolution::Rejected(NSE_REJECTION.to_string()));
    }

    #[tokio::test]
    async fn test_suffix_variants_resolve_identically() {
        for candidate in ["TCS", "TCS.NS"] {
            let resolver = resolver(search_with_hits(), listing_with(&["INFY"]), candidate);
            let query = CompanyQuery::parse("Tata Consultancy").unwrap();
            let resolution = resolver.resolve(&query).await.unwrap();
            assert_eq!(resolution, Resolution::Rejected(NSE_REJECTION.to_string()));
        }

        for candidate in ["TCS", "TCS.NS"] {
            let resolver = resolver(search_with_hits(), listing_with(&["TCS"]), candidate);
            let query = CompanyQuery::parse("Tata Consultancy").unwrap();
            let resolution = resolver.resolve(&query).await.unwrap();
            assert!(matches!(resolution, Resolution::Validated(_)));
        }
    }

    #[tokio::test]
    async fn test_listing_unavailable_fails_open() {
        let mut listing = MockSymbolListing::new();
        listing.expect_symbols().returning(|| None);

        let resolver = resolver(search_with_hits(), listing, "UNLISTEDCO");
        let query = CompanyQuery::parse("Unlisted Co").unwrap();
        let resolution = resolver.resolve(&query).await.unwrap();
        assert!(matches!(resolution, Resolution::Validated(_)));
    }

    #[tokio::test]
    async fn test_unparseable_extraction_rejects_explicitly() {
        let resolver = resolver(search_with_hits(), listing_with(&["TCS"]), "no idea");

        let query = CompanyQuery::parse("Mystery Co").unwrap();
        let resolution = resolver.resolve(&query).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Rejected(NO_TICKER_REJECTION.to_string())
        );
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let mut search = MockWebSearch::new();
        search
            .expect_search()
            .returning(|_, _, _| Err(AnalysisError::Search("timed out".to_string())));

        let resolver = resolver(search, listing_with(&["TCS"]), "TCS");
        let query = CompanyQuery::parse("Tata Consultancy").unwrap();
        assert!(resolver.resolve(&query).await.is_err());
    }
}
