//! Fundamental analysis
//!
//! Given a resolved ticker, pull the three financial statements and the live
//! info snapshot, forward-fill the statements, and compute ratios, growth
//! rates, valuation metrics, forward estimates, a simplified DCF value, and
//! rule-based interpretations. This component never raises: every failure is
//! described in the returned text.

use crate::api::yahoo::QuoteProvider;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fin::{
    ForwardEstimates, GrowthRates, Interpretations, KeyRatios, ValuationMetrics, simple_dcf,
};
use crate::symbol::strip_exchange_suffix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

/// The structured fundamental-analysis bundle
///
/// Serializes to the JSON the orchestrator places first in the consolidated
/// corpus; field labels are the ones the model reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalAnalysis {
    #[serde(rename = "Company Name")]
    pub company_name: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "Key Ratios")]
    pub key_ratios: KeyRatios,
    #[serde(rename = "Growth Rates")]
    pub growth_rates: GrowthRates,
    #[serde(rename = "Valuation Metrics")]
    pub valuation: ValuationMetrics,
    #[serde(rename = "Future Estimates")]
    pub estimates: ForwardEstimates,
    #[serde(rename = "Simple DCF Valuation")]
    pub simple_dcf_valuation: Option<f64>,
    #[serde(rename = "Last Updated")]
    pub last_updated: String,
    #[serde(rename = "Data Retrieval Date")]
    pub data_retrieval_date: String,
    #[serde(rename = "Interpretations")]
    pub interpretations: Interpretations,
}

/// Computes fundamental analyses from provider data
pub struct FundamentalsExtractor {
    provider: Arc<dyn QuoteProvider>,
    config: Arc<AnalysisConfig>,
}

impl FundamentalsExtractor {
    /// Create a new extractor
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Run the analysis and describe the outcome as text
    ///
    /// Success is the JSON-serialized [`FundamentalAnalysis`]; any failure is
    /// a descriptive sentence. Nothing is raised across this boundary.
    pub async fn analyze(&self, ticker: &str) -> String {
        match self.try_analyze(ticker).await {
            Ok(analysis) => serde_json::to_string(&analysis)
                .unwrap_or_else(|e| format!("An error occurred during the analysis: {e}")),
            Err(e) => {
                warn!("fundamental analysis for {ticker} failed: {e}");
                format!("An error occurred during the analysis: {e}")
            }
        }
    }

    /// Fetch, fill, and compute
    #[instrument(skip(self))]
    async fn try_analyze(&self, ticker: &str) -> Result<FundamentalAnalysis> {
        // This component works on the bare symbol and never appends a suffix
        let symbol = strip_exchange_suffix(ticker);

        let info = self.provider.info(symbol).await?;
        let mut statements = self.provider.statements(symbol).await?;

        // Carry the last known value forward before any computation
        statements.income.forward_fill();
        statements.balance.forward_fill();
        statements.cash_flow.forward_fill();

        let key_ratios = KeyRatios::from_info(&info);
        let growth_rates = GrowthRates::from_income(&statements.income);
        let valuation = ValuationMetrics::from_info(&info);
        let estimates = ForwardEstimates::from_info(&info);

        let free_cash_flow = statements.cash_flow.latest("Free Cash Flow");
        // An absent growth key falls back to the configured default; a key
        // that is present but non-numeric stays undefined and so does the DCF
        let growth_rate = match info.get("longTermPotentialGrowthRate") {
            None => Some(self.config.default_growth_rate),
            Some(_) => info.number("longTermPotentialGrowthRate"),
        };
        let simple_dcf_valuation = simple_dcf(
            free_cash_flow,
            growth_rate,
            self.config.wacc,
            self.config.dcf_horizon,
        );

        let interpretations = Interpretations::derive(&key_ratios, &growth_rates);

        let last_updated = DateTime::<Utc>::from_timestamp(
            info.number("lastFiscalYearEnd").unwrap_or(0.0) as i64,
            0,
        )
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string();

        Ok(FundamentalAnalysis {
            company_name: info.text("longName").map(ToString::to_string),
            sector: info.text("sector").map(ToString::to_string),
            industry: info.text("industry").map(ToString::to_string),
            key_ratios,
            growth_rates,
            valuation,
            estimates,
            simple_dcf_valuation,
            last_updated,
            data_retrieval_date: Utc::now().format("%Y-%m-%d").to_string(),
            interpretations,
        })
    }
}
