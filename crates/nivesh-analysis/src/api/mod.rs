//! External data-source clients and the traits the pipeline consumes them by

pub mod nse;
pub mod search;
pub mod yahoo;

pub use nse::{NseListingClient, SymbolListing};
pub use search::{DuckDuckGoClient, SearchHit, WebSearch, render_hits};
pub use yahoo::{FinancialStatements, InfoSnapshot, QuoteProvider, YahooFinanceClient};
