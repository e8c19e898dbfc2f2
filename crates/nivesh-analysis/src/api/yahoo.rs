//! Yahoo Finance quote-summary client
//!
//! Provides the info snapshot, the three financial statements, and the
//! analyst recommendation summary the pipeline consumes. Components depend on
//! the [`QuoteProvider`] trait; [`YahooFinanceClient`] implements it against
//! the public quoteSummary endpoint.

use crate::error::{AnalysisError, Result};
use crate::fin::FinancialTable;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const INFO_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData,price";
const STATEMENT_MODULES: &str =
    "incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Flat key/value snapshot of a listed company's live info
///
/// Keys follow the provider's camelCase naming (`trailingPE`, `marketCap`,
/// `grossMargins`, ...). Values are plain JSON scalars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoSnapshot(Map<String, Value>);

impl InfoSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Insert a value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Raw value of a key, if present (the value itself may be null)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric value of a key
    ///
    /// Accepts JSON numbers and numeric strings; a missing key or a null or
    /// non-numeric value is `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Nested numeric value, e.g. `revenueEstimates.avg`
    pub fn nested_number(&self, key: &str, subkey: &str) -> Option<f64> {
        self.0.get(key)?.get(subkey)?.as_f64()
    }

    /// String value of a key
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_str()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// The three financial statements for one company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    /// Income statement
    pub income: FinancialTable,
    /// Balance sheet
    pub balance: FinancialTable,
    /// Cash flow statement
    pub cash_flow: FinancialTable,
}

/// Trait for financial data providers
///
/// Keyed by ticker symbol; whether the symbol must carry an exchange suffix
/// is the caller's concern, not the provider's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Live info snapshot for a symbol
    async fn info(&self, symbol: &str) -> Result<InfoSnapshot>;

    /// Financial statements for a symbol
    async fn statements(&self, symbol: &str) -> Result<FinancialStatements>;

    /// Analyst recommendation summary, if the provider has one
    ///
    /// Absence is not an error; it degrades to `None`.
    async fn recommendations_summary(&self, symbol: &str) -> Result<Option<String>>;
}

/// Yahoo Finance quoteSummary client
pub struct YahooFinanceClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a new client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let quota = Quota::per_minute(NonZeroU32::new(30).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Fetch the named quoteSummary modules for a symbol
    #[instrument(skip(self))]
    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let url = format!("{QUOTE_SUMMARY_URL}/{symbol}");
        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .query(&[("modules", modules)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Provider(format!(
                "quoteSummary request for {symbol} failed with HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        if let Some(error) = body
            .pointer("/quoteSummary/error")
            .filter(|e| !e.is_null())
        {
            return Err(AnalysisError::Provider(format!(
                "quoteSummary error for {symbol}: {error}"
            )));
        }

        body.pointer("/quoteSummary/result/0")
            .cloned()
            .ok_or_else(|| AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "empty quoteSummary result".to_string(),
            })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn info(&self, symbol: &str) -> Result<InfoSnapshot> {
        let result = self.quote_summary(symbol, INFO_MODULES).await?;
        let snapshot = flatten_modules(&result);
        debug!("info snapshot for {symbol} has {} keys", snapshot.0.len());
        Ok(snapshot)
    }

    async fn statements(&self, symbol: &str) -> Result<FinancialStatements> {
        let result = self.quote_summary(symbol, STATEMENT_MODULES).await?;

        let income = statement_table(
            result.pointer("/incomeStatementHistory/incomeStatementHistory"),
        );
        let balance = statement_table(
            result.pointer("/balanceSheetHistory/balanceSheetStatements"),
        );
        let mut cash_flow = statement_table(
            result.pointer("/cashflowStatementHistory/cashflowStatements"),
        );
        derive_free_cash_flow(&mut cash_flow);

        if income.is_empty() && balance.is_empty() && cash_flow.is_empty() {
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no financial statements".to_string(),
            });
        }

        Ok(FinancialStatements {
            income,
            balance,
            cash_flow,
        })
    }

    async fn recommendations_summary(&self, symbol: &str) -> Result<Option<String>> {
        let result = match self.quote_summary(symbol, "recommendationTrend").await {
            Ok(result) => result,
            // Missing recommendations are an expected degradation
            Err(AnalysisError::DataUnavailable { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(trend) = result
            .pointer("/recommendationTrend/trend")
            .and_then(Value::as_array)
        else {
            return Ok(None);
        };

        if trend.is_empty() {
            return Ok(None);
        }

        let mut summary = String::from("period  strongBuy  buy  hold  sell  strongSell");
        for entry in trend {
            summary.push_str(&format!(
                "\n{:<7} {:>9} {:>4} {:>5} {:>5} {:>11}",
                entry.get("period").and_then(Value::as_str).unwrap_or("-"),
                entry.get("strongBuy").and_then(Value::as_i64).unwrap_or(0),
                entry.get("buy").and_then(Value::as_i64).unwrap_or(0),
                entry.get("hold").and_then(Value::as_i64).unwrap_or(0),
                entry.get("sell").and_then(Value::as_i64).unwrap_or(0),
                entry.get("strongSell").and_then(Value::as_i64).unwrap_or(0),
            ));
        }

        Ok(Some(summary))
    }
}

/// Flatten quoteSummary modules into one key/value snapshot
///
/// The endpoint wraps numbers as `{"raw": ..., "fmt": ...}`; only the raw
/// value is kept. Scalar fields pass through unchanged.
fn flatten_modules(result: &Value) -> InfoSnapshot {
    let mut snapshot = InfoSnapshot::new();

    let Some(modules) = result.as_object() else {
        return snapshot;
    };

    for module in modules.values() {
        let Some(fields) = module.as_object() else {
            continue;
        };
        for (key, value) in fields {
            match value {
                Value::Object(wrapped) => {
                    if let Some(raw) = wrapped.get("raw") {
                        snapshot.insert(key.clone(), raw.clone());
                    }
                }
                Value::Array(_) => {}
                other => snapshot.insert(key.clone(), other.clone()),
            }
        }
    }

    snapshot
}

/// Build a [`FinancialTable`] from a quoteSummary statement array
///
/// Statements arrive most recent first; line-item keys keep their first-seen
/// order and are humanised from camelCase to the provider's display labels.
fn statement_table(statements: Option<&Value>) -> FinancialTable {
    let Some(statements) = statements.and_then(Value::as_array) else {
        return FinancialTable::default();
    };

    let periods: Vec<String> = statements
        .iter()
        .map(|s| {
            s.pointer("/endDate/fmt")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_string()
        })
        .collect();

    // Union of line-item keys across periods, first-seen order
    let mut labels: Vec<String> = Vec::new();
    for statement in statements {
        let Some(fields) = statement.as_object() else {
            continue;
        };
        for key in fields.keys() {
            if key == "endDate" || key == "maxAge" {
                continue;
            }
            if !labels.iter().any(|l| l == key) {
                labels.push(key.clone());
            }
        }
    }

    let mut table = FinancialTable::new(periods);
    for key in &labels {
        let values: Vec<Option<f64>> = statements
            .iter()
            .map(|s| s.pointer(&format!("/{key}/raw")).and_then(Value::as_f64))
            .collect();
        table.push_row(humanize_key(key), values);
    }

    table
}

/// Add a Free Cash Flow row when operating cash flow and capex are present
///
/// quoteSummary does not report free cash flow per period; it is operating
/// cash flow plus (negative) capital expenditures.
fn derive_free_cash_flow(cash_flow: &mut FinancialTable) {
    let (Some(operating), Some(capex)) = (
        cash_flow.row("Total Cash From Operating Activities"),
        cash_flow.row("Capital Expenditures"),
    ) else {
        return;
    };

    let values: Vec<Option<f64>> = operating
        .iter()
        .zip(capex.iter())
        .map(|(op, cap)| Some(op.as_ref()? + cap.as_ref()?))
        .collect();

    cash_flow.push_row("Free Cash Flow", values);
}

/// "totalRevenue" -> "Total Revenue"
fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                label.push(' ');
            }
            label.push(c);
        }
    }
    label
}
