//! Company queries and ticker symbols
//!
//! Input validation happens here, before any network call: a company name
//! must look word-like, and a resolved ticker must be an uppercase exchange
//! symbol. Exchange-suffix handling is centralised so every component applies
//! it identically.

use crate::error::{AnalysisError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static COMPANY_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w.\-#&\s]*$").expect("valid company name pattern"));

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+$").expect("valid ticker pattern"));

/// A validated free-text company name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyQuery(String);

impl CompanyQuery {
    /// Validate a raw company name
    ///
    /// Must start with a word character and contain only letters, digits,
    /// `.`, `-`, `#`, `&`, and whitespace. Rejection happens before any I/O.
    pub fn parse(raw: &str) -> Result<Self> {
        if COMPANY_NAME_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AnalysisError::InvalidCompanyName(raw.to_string()))
        }
    }

    /// The validated name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated exchange ticker symbol, stored without any exchange suffix
///
/// Produced once per query and carried unchanged through the pipeline;
/// downstream steps never re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTicker(String);

impl ResolvedTicker {
    /// Validate a candidate symbol
    ///
    /// Any existing exchange suffix is stripped first, then the bare symbol
    /// must be uppercase letters only. A candidate that fails the shape is an
    /// explicit [`AnalysisError::NoTickerFound`], never silently accepted.
    pub fn parse(candidate: &str) -> Result<Self> {
        let bare = strip_exchange_suffix(candidate.trim());
        if TICKER_PATTERN.is_match(bare) {
            Ok(Self(bare.to_string()))
        } else {
            Err(AnalysisError::NoTickerFound)
        }
    }

    /// The bare symbol without any exchange suffix
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// The symbol qualified with the given exchange suffix
    pub fn with_suffix(&self, suffix: &str) -> String {
        with_exchange_suffix(&self.0, suffix)
    }
}

impl fmt::Display for ResolvedTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip an exchange suffix from a symbol, dropping at most one dot-segment
///
/// `"TCS.NS"` becomes `"TCS"`; `"TCS"` is unchanged.
pub fn strip_exchange_suffix(symbol: &str) -> &str {
    match symbol.split_once('.') {
        Some((bare, _)) => bare,
        None => symbol,
    }
}

/// Qualify a symbol with an exchange suffix
///
/// Strips any existing suffix first, so the operation is idempotent:
/// applying it twice yields the same string as applying it once.
pub fn with_exchange_suffix(symbol: &str, suffix: &str) -> String {
    format!("{}{}", strip_exchange_suffix(symbol), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_query_accepts_word_like_names() {
        assert!(CompanyQuery::parse("Reliance Industries").is_ok());
        assert!(CompanyQuery::parse("M&M").is_ok());
        assert!(CompanyQuery::parse("3M India").is_ok());
        assert!(CompanyQuery::parse("L-T #42").is_ok());
    }

    #[test]
    fn test_company_query_rejects_malformed_names() {
        assert!(matches!(
            CompanyQuery::parse(""),
            Err(AnalysisError::InvalidCompanyName(_))
        ));
        assert!(CompanyQuery::parse("  leading space").is_err());
        assert!(CompanyQuery::parse("-starts with dash").is_err());
        // apostrophe is outside the allowed character class
        assert!(CompanyQuery::parse("Dr. Reddy's").is_err());
    }

    #[test]
    fn test_ticker_parse_strips_suffix() {
        let ticker = ResolvedTicker::parse("TCS.NS").unwrap();
        assert_eq!(ticker.symbol(), "TCS");

        let ticker = ResolvedTicker::parse("RELIANCE").unwrap();
        assert_eq!(ticker.symbol(), "RELIANCE");
    }

    #[test]
    fn test_ticker_parse_rejects_non_uppercase() {
        assert!(matches!(
            ResolvedTicker::parse("tcs"),
            Err(AnalysisError::NoTickerFound)
        ));
        assert!(ResolvedTicker::parse("TCS 500").is_err());
        assert!(ResolvedTicker::parse("").is_err());
    }

    #[test]
    fn test_strip_drops_at_most_one_segment() {
        assert_eq!(strip_exchange_suffix("TCS.NS"), "TCS");
        assert_eq!(strip_exchange_suffix("TCS"), "TCS");
        // Everything after the first dot goes, in one step
        assert_eq!(strip_exchange_suffix("TCS.NS.X"), "TCS");
    }

    #[test]
    fn test_suffix_application_is_idempotent() {
        let once = with_exchange_suffix("TCS", ".NS");
        let twice = with_exchange_suffix(&once, ".NS");
        assert_eq!(once, "TCS.NS");
        assert_eq!(once, twice);

        // Already-qualified input resolves identically
        assert_eq!(with_exchange_suffix("TCS.NS", ".NS"), "TCS.NS");
        assert_eq!(with_exchange_suffix("TCS.BO", ".NS"), "TCS.NS");
    }
}
