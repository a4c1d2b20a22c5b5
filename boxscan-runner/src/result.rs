//! ScreeningResult — the snapshot kept for an instrument that passed
//! every stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Presentation snapshot for one surviving instrument. Created once, never
/// mutated; metric values are rounded to two decimals for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub code: String,
    pub name: String,
    /// Circulating market cap, reporting unit.
    pub circulating_market_cap: f64,
    /// Target-date close.
    pub close: f64,
    /// Moving-average values at the target date, keyed by period.
    pub ma_values: BTreeMap<usize, f64>,
    /// Volume growth over the previous trading day, percent
    /// (`(ratio - 1) * 100`).
    pub volume_growth_pct: f64,
    pub turnover_rate_pct: f64,
    pub concentration70: f64,
    /// Upper edge of the trailing box.
    pub box_upper: f64,
    /// Margin by which the close cleared the box, percent.
    pub breakout_ratio_pct: f64,
}

/// Round to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
