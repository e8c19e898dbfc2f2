//! Stock info formatting
//!
//! Filters the live info snapshot to a fixed allow-list and renders it in
//! human-readable units: growth/margin/change figures as percentages,
//! market-cap figures in crores, everything else unmodified. The analyst
//! recommendation table is best-effort and degrades to a blank section.

use crate::api::yahoo::QuoteProvider;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::symbol::with_exchange_suffix;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument, warn};

/// The only info keys ever surfaced, in output order
const INCLUDED_KEYS: &[&str] = &[
    "industry",
    "sector",
    "longBusinessSummary",
    "previousClose",
    "dividendRate",
    "dividendYield",
    "beta",
    "forwardPE",
    "volume",
    "marketCap",
    "fiftyTwoWeekLow",
    "fiftyTwoWeekHigh",
    "currency",
    "bookValue",
    "priceToBook",
    "earningsQuarterlyGrowth",
    "trailingEps",
    "forwardEps",
    "52WeekChange",
    "totalCashPerShare",
    "ebitda",
    "totalDebt",
    "debtToEquity",
    "revenuePerShare",
    "earningsGrowth",
    "revenueGrowth",
    "grossMargins",
    "ebitdaMargins",
    "operatingMargins",
];

static PERCENT_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(Growth|Margin|Change)").expect("valid percent key pattern"));

/// Formats the allow-listed stock info and recommendation summary
pub struct StockInfoFormatter {
    provider: Arc<dyn QuoteProvider>,
    config: Arc<AnalysisConfig>,
}

impl StockInfoFormatter {
    /// Create a new formatter
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Render the stock info section, describing any failure in the output
    pub async fn format(&self, ticker: &str) -> String {
        match self.try_format(ticker).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("stock info for {ticker} failed: {e}");
                format!("An error occurred while fetching stock info: {e}")
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_format(&self, ticker: &str) -> Result<String> {
        // Exchange-qualify the symbol; strip-then-append keeps this idempotent
        let symbol = with_exchange_suffix(ticker, &self.config.exchange_suffix);

        let info = self.provider.info(&symbol).await?;

        // Recommendations are best effort; absence is a blank section
        let recommendations = match self.provider.recommendations_summary(&symbol).await {
            Ok(summary) => summary,
            Err(e) => {
                debug!("no recommendations for {symbol}: {e}");
                None
            }
        };

        let mut response = String::from("## Stock info:\n");
        for &key in INCLUDED_KEYS {
            let Some(value) = info.get(key) else {
                continue;
            };
            response.push_str(&render_entry(key, value));
        }

        response.push_str("\n## Analyst Recommendations:\n");
        response.push_str(&format!("\n{}", recommendations.unwrap_or_default()));

        Ok(response)
    }
}

/// Render one allow-listed entry with its unit rule applied
fn render_entry(key: &str, value: &Value) -> String {
    if let Some(number) = value.as_f64() {
        if PERCENT_KEY_RE.is_match(key) {
            return format!("{key}: {} %\n", round_to(number * 100.0, 3));
        }
        if key.contains("marketCap") {
            return format!("{key}: {} Cr.\n", round_to(number * 1e-7, 2));
        }
    }

    match value {
        Value::String(s) => format!("{key}: {s}\n"),
        other => format!("{key}: {other}\n"),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
