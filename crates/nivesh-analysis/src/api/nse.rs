//! NSE equity listing client
//!
//! The authoritative symbol set comes from the NSE archives' equity list CSV.
//! The endpoint is flaky, so availability is modelled explicitly: [`None`]
//! means "no validation available", which is a different answer than a
//! symbol being absent from a fetched set. Validation fails open on `None`.

use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EQUITY_LIST_URL: &str = "https://nsearchives.nseindia.com/content/equities/EQUITY_L.csv";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const SYMBOL_COLUMN: &str = "SYMBOL";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Trait for authoritative exchange symbol listings
///
/// Returns the current symbol set, or `None` when the listing source is
/// unavailable. The listing is refetched per query, never cached, so
/// concurrent queries share no mutable state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SymbolListing: Send + Sync {
    /// Fetch the symbol set; `None` means the listing is unavailable
    async fn symbols(&self) -> Option<HashSet<String>>;
}

/// NSE archives equity-list client
pub struct NseListingClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

impl NseListingClient {
    /// Create a new client with the given request timeout
    ///
    /// The archive host throttles aggressive callers, so requests are rate
    /// limited to one per second.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let quota = Quota::per_second(NonZeroU32::new(1).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Fetch and parse the equity list
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<HashSet<String>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(EQUITY_LIST_URL)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Other(format!(
                "NSE equity list request failed with HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let symbols = parse_symbol_column(&body)?;
        debug!("fetched {} NSE symbols", symbols.len());
        Ok(symbols)
    }
}

#[async_trait]
impl SymbolListing for NseListingClient {
    async fn symbols(&self) -> Option<HashSet<String>> {
        match self.fetch().await {
            Ok(symbols) => Some(symbols),
            Err(e) => {
                warn!("NSE listing unavailable, skipping validation: {e}");
                None
            }
        }
    }
}

/// Pull the SYMBOL column out of the equity-list CSV
fn parse_symbol_column(csv_text: &str) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let symbol_index = reader
        .headers()?
        .iter()
        .position(|h| h == SYMBOL_COLUMN)
        .ok_or_else(|| {
            AnalysisError::Other(format!("NSE equity list has no {SYMBOL_COLUMN} column"))
        })?;

    let mut symbols = HashSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(symbol_index) {
            if !symbol.is_empty() {
                symbols.insert(symbol.to_string());
            }
        }
    }

    Ok(symbols)
}
