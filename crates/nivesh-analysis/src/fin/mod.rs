//! Financial data shaping and quantitative computations

pub mod dcf;
pub mod ratios;
pub mod table;

pub use dcf::simple_dcf;
pub use ratios::{ForwardEstimates, GrowthRates, Interpretations, KeyRatios, ValuationMetrics};
pub use table::FinancialTable;
