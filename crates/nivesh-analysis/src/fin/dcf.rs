//! Simplified discounted-cash-flow valuation

/// Simplified DCF over a fixed horizon with a Gordon-growth terminal value
///
/// Projects free cash flow at `growth_rate` for `periods` periods, discounts
/// each at `wacc`, and adds the discounted terminal value
/// `fcf * (1 + g) / (wacc - g)` at the end of the horizon.
///
/// An undefined free cash flow or growth rate yields an undefined valuation,
/// never a substituted default. A growth rate at or above `wacc` makes the
/// perpetuity formula degenerate, so that is undefined too.
pub fn simple_dcf(
    fcf: Option<f64>,
    growth_rate: Option<f64>,
    wacc: f64,
    periods: u32,
) -> Option<f64> {
    let fcf = fcf?;
    let growth_rate = growth_rate?;

    if wacc <= growth_rate {
        return None;
    }

    let terminal_value = fcf * (1.0 + growth_rate) / (wacc - growth_rate);

    let mut value = 0.0;
    for i in 1..=periods {
        value += fcf * (1.0 + growth_rate).powi(i as i32) / (1.0 + wacc).powi(i as i32);
    }
    value += terminal_value / (1.0 + wacc).powi(periods as i32);

    Some(value)
}
