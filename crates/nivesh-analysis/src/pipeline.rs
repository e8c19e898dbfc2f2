//! Analysis orchestration
//!
//! The control loop that composes resolution, fundamentals, statements, stock
//! info, and news into one run. Stages advance strictly forward through an
//! explicit state machine; rejection is terminal and short-circuits the run.
//! Once the ticker is validated the four retrievals are independent, so they
//! execute concurrently, but the consolidated corpus keeps its fixed order by
//! construction.

use crate::api::nse::SymbolListing;
use crate::api::search::WebSearch;
use crate::api::yahoo::QuoteProvider;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::fundamentals::FundamentalsExtractor;
use crate::news::NewsRetriever;
use crate::resolver::{Resolution, TickerResolver};
use crate::statements::StatementFormatter;
use crate::stock_info::StockInfoFormatter;
use crate::symbol::CompanyQuery;
use nivesh_llm::LlmProvider;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Stages of one analysis run, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    NameExtracted,
    TickerResolved,
    Validated,
    Rejected,
    FundamentalsFetched,
    InfoFetched,
    NewsFetched,
    Consolidated,
    Done,
}

impl PipelineStage {
    /// Whether `next` is a legal successor of this stage
    ///
    /// Transitions are strictly forward; `Rejected` goes straight to `Done`.
    pub fn may_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::{
            Consolidated, Done, FundamentalsFetched, InfoFetched, NameExtracted, NewsFetched,
            Rejected, Start, TickerResolved, Validated,
        };
        matches!(
            (self, next),
            (Start, NameExtracted)
                | (NameExtracted, TickerResolved)
                | (TickerResolved, Validated)
                | (TickerResolved, Rejected)
                | (Validated, FundamentalsFetched)
                | (FundamentalsFetched, InfoFetched)
                | (InfoFetched, NewsFetched)
                | (NewsFetched, Consolidated)
                | (Consolidated, Done)
                | (Rejected, Done)
        )
    }
}

/// Per-run state: a fresh id and the current stage
///
/// Everything a run touches lives in locals like this one; nothing is shared
/// across concurrent runs, so the pipeline is safe to invoke re-entrantly.
struct PipelineRun {
    id: Uuid,
    stage: PipelineStage,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: PipelineStage::Start,
        }
    }

    fn advance(&mut self, next: PipelineStage) -> Result<()> {
        if !self.stage.may_advance_to(next) {
            return Err(AnalysisError::Other(format!(
                "illegal pipeline transition {:?} -> {next:?}",
                self.stage
            )));
        }
        debug!(run = %self.id, "pipeline {:?} -> {next:?}", self.stage);
        self.stage = next;
        Ok(())
    }
}

/// The analysis orchestrator
pub struct AnalysisPipeline {
    resolver: TickerResolver,
    fundamentals: FundamentalsExtractor,
    statements: StatementFormatter,
    stock_info: StockInfoFormatter,
    news: NewsRetriever,
}

impl AnalysisPipeline {
    /// Wire a pipeline from its external capabilities
    pub fn new(
        search: Arc<dyn WebSearch>,
        provider: Arc<dyn QuoteProvider>,
        listing: Arc<dyn SymbolListing>,
        llm: Arc<dyn LlmProvider>,
        config: Arc<AnalysisConfig>,
    ) -> Self {
        Self {
            resolver: TickerResolver::new(
                Arc::clone(&search),
                listing,
                llm,
                Arc::clone(&config),
            ),
            fundamentals: FundamentalsExtractor::new(Arc::clone(&provider), Arc::clone(&config)),
            statements: StatementFormatter::new(Arc::clone(&provider), Arc::clone(&config)),
            stock_info: StockInfoFormatter::new(provider, Arc::clone(&config)),
            news: NewsRetriever::new(search, config),
        }
    }

    /// Analyse a company query, always returning text
    ///
    /// This is the composite tool entry point: any failure the run did not
    /// already describe is converted to one final error string here, so the
    /// caller always receives a string and never an unhandled fault.
    pub async fn analyse_company(&self, company_name: &str) -> String {
        match self.try_analyse(company_name).await {
            Ok(corpus) => corpus,
            Err(e) => format!("Error fetching data, please try again: {e}"),
        }
    }

    /// Run the pipeline, surfacing failures as errors
    #[instrument(skip(self))]
    pub async fn try_analyse(&self, company_name: &str) -> Result<String> {
        let mut run = PipelineRun::new();

        // Input validation happens before any network call
        let company = CompanyQuery::parse(company_name)?;
        run.advance(PipelineStage::NameExtracted)?;

        let resolution = self.resolver.resolve(&company).await?;
        run.advance(PipelineStage::TickerResolved)?;

        let ticker = match resolution {
            Resolution::Validated(ticker) => {
                run.advance(PipelineStage::Validated)?;
                ticker
            }
            Resolution::Rejected(message) => {
                info!(run = %run.id, "resolution rejected: {message}");
                run.advance(PipelineStage::Rejected)?;
                run.advance(PipelineStage::Done)?;
                return Ok(message);
            }
        };

        // The four retrievals are independent given the resolved ticker; run
        // them concurrently and fold the results back in the fixed order
        let symbol = ticker.symbol();
        let (fundamentals, stock_info, statements, news) = tokio::join!(
            self.fundamentals.analyze(symbol),
            self.stock_info.format(symbol),
            self.statements.format(symbol),
            self.news.fetch(symbol),
        );
        run.advance(PipelineStage::FundamentalsFetched)?;
        run.advance(PipelineStage::InfoFetched)?;
        run.advance(PipelineStage::NewsFetched)?;

        let corpus = [fundamentals, stock_info, statements, news].join("\n");
        run.advance(PipelineStage::Consolidated)?;
        run.advance(PipelineStage::Done)?;

        Ok(corpus)
    }
}
