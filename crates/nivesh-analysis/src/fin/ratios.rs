//! Key ratios, growth rates, valuation metrics, and their interpretations
//!
//! Serde field renames follow the report labels the model receives, so
//! serializing these structs produces the analysis JSON directly.

use crate::api::yahoo::InfoSnapshot;
use crate::fin::table::FinancialTable;
use serde::{Deserialize, Serialize};

/// Valuation, profitability, and liquidity ratios from the info snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyRatios {
    #[serde(rename = "P/E Ratio")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "Forward P/E")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "P/B Ratio")]
    pub pb_ratio: Option<f64>,
    #[serde(rename = "P/S Ratio")]
    pub ps_ratio: Option<f64>,
    #[serde(rename = "PEG Ratio")]
    pub peg_ratio: Option<f64>,
    #[serde(rename = "Debt to Equity")]
    pub debt_to_equity: Option<f64>,
    #[serde(rename = "Current Ratio")]
    pub current_ratio: Option<f64>,
    #[serde(rename = "Quick Ratio")]
    pub quick_ratio: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "ROA")]
    pub roa: Option<f64>,
    #[serde(rename = "ROIC")]
    pub roic: Option<f64>,
    #[serde(rename = "Gross Margin")]
    pub gross_margin: Option<f64>,
    #[serde(rename = "Operating Margin")]
    pub operating_margin: Option<f64>,
    #[serde(rename = "Net Profit Margin")]
    pub net_profit_margin: Option<f64>,
    #[serde(rename = "Dividend Yield")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "Payout Ratio")]
    pub payout_ratio: Option<f64>,
}

impl KeyRatios {
    /// Pull the ratio set out of an info snapshot
    pub fn from_info(info: &InfoSnapshot) -> Self {
        Self {
            pe_ratio: info.number("trailingPE"),
            forward_pe: info.number("forwardPE"),
            pb_ratio: info.number("priceToBook"),
            ps_ratio: info.number("priceToSalesTrailing12Months"),
            peg_ratio: info.number("pegRatio"),
            debt_to_equity: info.number("debtToEquity"),
            current_ratio: info.number("currentRatio"),
            quick_ratio: info.number("quickRatio"),
            roe: info.number("returnOnEquity"),
            roa: info.number("returnOnAssets"),
            roic: info.number("returnOnCapital"),
            gross_margin: info.number("grossMargins"),
            operating_margin: info.number("operatingMargins"),
            net_profit_margin: info.number("profitMargins"),
            dividend_yield: info.number("dividendYield"),
            payout_ratio: info.number("payoutRatio"),
        }
    }
}

/// Year-over-year growth rates from the income statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    #[serde(rename = "Revenue Growth (YoY)")]
    pub revenue_growth: Option<f64>,
    #[serde(rename = "Net Income Growth (YoY)")]
    pub net_income_growth: Option<f64>,
}

impl GrowthRates {
    /// Compute growth from a (forward-filled) income statement
    pub fn from_income(income: &FinancialTable) -> Self {
        Self {
            revenue_growth: income.growth_rate("Total Revenue"),
            net_income_growth: income.growth_rate("Net Income"),
        }
    }
}

/// Market valuation metrics from the info snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    #[serde(rename = "Market Cap")]
    pub market_cap: Option<f64>,
    #[serde(rename = "Enterprise Value")]
    pub enterprise_value: Option<f64>,
    #[serde(rename = "EV/EBITDA")]
    pub ev_to_ebitda: Option<f64>,
    #[serde(rename = "EV/Revenue")]
    pub ev_to_revenue: Option<f64>,
}

impl ValuationMetrics {
    /// Pull valuation metrics out of an info snapshot
    pub fn from_info(info: &InfoSnapshot) -> Self {
        Self {
            market_cap: info.number("marketCap"),
            enterprise_value: info.number("enterpriseValue"),
            ev_to_ebitda: info.number("enterpriseToEbitda"),
            ev_to_revenue: info.number("enterpriseToRevenue"),
        }
    }
}

/// Forward-looking analyst estimates from the info snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardEstimates {
    #[serde(rename = "Next Year EPS Estimate")]
    pub next_year_eps: Option<f64>,
    #[serde(rename = "Next Year Revenue Estimate")]
    pub next_year_revenue: Option<f64>,
    #[serde(rename = "Long-term Growth Rate")]
    pub long_term_growth_rate: Option<f64>,
}

impl ForwardEstimates {
    /// Pull forward estimates out of an info snapshot
    pub fn from_info(info: &InfoSnapshot) -> Self {
        Self {
            next_year_eps: info.number("forwardEps"),
            next_year_revenue: info.nested_number("revenueEstimates", "avg"),
            long_term_growth_rate: info.number("longTermPotentialGrowthRate"),
        }
    }
}

/// Rule-based qualitative readings of four headline ratios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretations {
    #[serde(rename = "P/E Ratio")]
    pub pe_ratio: String,
    #[serde(rename = "Debt to Equity")]
    pub debt_to_equity: String,
    #[serde(rename = "ROE")]
    pub roe: String,
    #[serde(rename = "Revenue Growth")]
    pub revenue_growth: String,
}

impl Interpretations {
    /// Apply the fixed thresholds to the computed ratios
    pub fn derive(ratios: &KeyRatios, growth: &GrowthRates) -> Self {
        let pe_ratio = if ratios.pe_ratio.unwrap_or(0.0) > 16.0 {
            "High P/E might indicate overvaluation or high growth expectations"
        } else {
            "Low P/E might indicate undervaluation or low growth expectations"
        };

        let debt_to_equity = if ratios.debt_to_equity.unwrap_or(0.0) > 2.0 {
            "High leverage"
        } else {
            "Conservative capital structure"
        };

        let roe = match ratios.roe {
            None => "Couldn't find ROE",
            Some(roe) if roe == 0.0 => "Couldn't find ROE",
            Some(roe) if roe > 0.15 => "Strong returns",
            Some(_) => "Potential profitability issues",
        };

        let revenue_growth = if growth.revenue_growth.unwrap_or(0.0) > 0.1 {
            "Strong growth"
        } else {
            "Slowing growth"
        };

        Self {
            pe_ratio: pe_ratio.to_string(),
            debt_to_equity: debt_to_equity.to_string(),
            roe: roe.to_string(),
            revenue_growth: revenue_growth.to_string(),
        }
    }
}
