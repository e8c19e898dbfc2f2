//! Financial statement formatting
//!
//! Renders the balance sheet as the crore-denominated text table the corpus
//! carries: at most the three most recent periods, rows with any missing
//! value dropped, values converted to crores, labels annotated with the unit.

use crate::api::yahoo::QuoteProvider;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::symbol::with_exchange_suffix;
use std::sync::Arc;
use tracing::{instrument, warn};

const RETAINED_PERIODS: usize = 3;

/// Formats financial statements for the consolidated corpus
pub struct StatementFormatter {
    provider: Arc<dyn QuoteProvider>,
    config: Arc<AnalysisConfig>,
}

impl StatementFormatter {
    /// Create a new formatter
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self { provider, config }
    }

    /// Render the balance sheet as text, describing any failure in the output
    pub async fn format(&self, ticker: &str) -> String {
        match self.try_format(ticker).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("financial statements for {ticker} failed: {e}");
                format!("An error occurred while fetching financial statements: {e}")
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_format(&self, ticker: &str) -> Result<String> {
        // Exchange-qualify the symbol; strip-then-append keeps this idempotent
        let symbol = with_exchange_suffix(ticker, &self.config.exchange_suffix);

        let statements = self.provider.statements(&symbol).await?;
        let mut balance = statements.balance;

        balance.keep_recent(RETAINED_PERIODS);
        // Rows with gaps are dropped entirely, not filled
        balance.drop_incomplete_rows();
        balance.to_crores();

        Ok(format!("\n{balance}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::yahoo::{FinancialStatements, MockQuoteProvider};
    use crate::fin::FinancialTable;

    fn balance_sheet() -> FinancialStatements {
        let mut balance = FinancialTable::new(vec![
            "2024-03-31".to_string(),
            "2023-03-31".to_string(),
            "2022-03-31".to_string(),
            "2021-03-31".to_string(),
        ]);
        balance.push_row(
            "Total Assets",
            vec![Some(2.5e12), Some(2.2e12), Some(2.0e12), Some(1.8e12)],
        );
        balance.push_row(
            "Total Liabilities",
            vec![Some(1.0e12), None, Some(0.8e12), Some(0.7e12)],
        );

        FinancialStatements {
            income: FinancialTable::default(),
            balance,
            cash_flow: FinancialTable::default(),
        }
    }

    #[tokio::test]
    async fn test_format_shapes_balance_sheet() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_statements()
            .withf(|symbol| symbol == "RELIANCE.NS")
            .returning(|_| Ok(balance_sheet()));

        let formatter = StatementFormatter::new(
            Arc::new(provider),
            Arc::new(AnalysisConfig::default()),
        );

        // Already-qualified input must not double-qualify
        let rendered = formatter.format("RELIANCE.NS").await;

        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("Total Assets (in Crores.)"));
        // 2.5e12 raw -> 250000 crores
        assert!(rendered.contains("250000.00"));
        // Incomplete row dropped entirely
        assert!(!rendered.contains("Total Liabilities"));
        // Fourth period truncated
        assert!(!rendered.contains("2021-03-31"));
    }

    #[tokio::test]
    async fn test_format_error_becomes_text() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_statements().returning(|_| {
            Err(crate::error::AnalysisError::Provider("HTTP 502".to_string()))
        });

        let formatter = StatementFormatter::new(
            Arc::new(provider),
            Arc::new(AnalysisConfig::default()),
        );

        let rendered = formatter.format("RELIANCE").await;
        assert!(rendered.starts_with("An error occurred while fetching financial statements:"));
    }
}
