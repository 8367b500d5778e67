//! Margin and markup arithmetic shared by the wine endpoints and the
//! profitability reports.
//!
//! All percentages are rounded to two decimal places at the edge so JSON
//! output stays stable regardless of which query produced the inputs.

/// Cost-of-goods target for wine programs: bottle cost should be about
/// 35% of the list price.
pub const COGS_RATIO: f64 = 0.35;

/// Margin threshold (percent) below which a price adjustment is suggested.
pub const TARGET_MARGIN_PCT: f64 = 60.0;

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Gross margin as a percentage of the selling price, or `None` when the
/// price is non-positive.
pub fn profit_margin(price: f64, cost: f64) -> Option<f64> {
    (price > 0.0).then(|| round2((price - cost) / price * 100.0))
}

/// Markup over cost as a percentage, or `None` when the cost is non-positive.
pub fn markup(price: f64, cost: f64) -> Option<f64> {
    (cost > 0.0).then(|| round2((price - cost) / cost * 100.0))
}

/// Suggested list price for an under-margin wine, derived from [`COGS_RATIO`].
/// Wines already at or above [`TARGET_MARGIN_PCT`] get no suggestion.
pub fn recommended_price(cost: f64, current_margin: f64) -> Option<f64> {
    (current_margin < TARGET_MARGIN_PCT).then(|| round2(cost / COGS_RATIO))
}
