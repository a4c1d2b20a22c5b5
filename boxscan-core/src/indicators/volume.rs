//! Volume-derived metrics: growth ratio and turnover rate.

/// Ratio of target-day volume to the previous trading day's volume.
///
/// "Previous" means the series entry immediately before the target date in
/// the sorted series, not the calendar-previous day; markets skip days.
pub fn volume_growth_ratio(target_volume: u64, prev_volume: u64) -> f64 {
    target_volume as f64 / prev_volume as f64
}

/// Turnover rate as a percentage.
///
/// The formula is `volume_lots * 100 / circulating_shares_10k`, preserved
/// literally from the source system including its unit mismatch (volume in
/// lots of 100 shares, shares in 10,000-share blocks). Do not "correct" it
/// without a confirmed unit ruling; `turnover_formula_is_literal` pins the
/// exact arithmetic.
pub fn turnover_rate_pct(target_volume: u64, circulating_shares_10k: f64) -> f64 {
    (target_volume as f64 * 100.0) / circulating_shares_10k
}
