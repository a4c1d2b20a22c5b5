//! Pure indicator functions over an ordered DailyBar series.
//!
//! All functions assume the series is sorted ascending by date with unique
//! dates (the runner's source layer enforces this before computation). None
//! of them perform I/O or hold mutable state.

pub mod box_range;
pub mod ma_break;
pub mod sma;
pub mod volume;

pub use box_range::{box_upper, breakout, Breakout};
pub use ma_break::{ma_break, MaBreakMode};
pub use sma::moving_average;
pub use volume::{turnover_rate_pct, volume_growth_ratio};

use thiserror::Error;

/// Errors from windowed computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("insufficient window: {have} qualifying bars, need {need}")]
    InsufficientWindow { have: usize, need: usize },
}

/// Create bars from close prices for testing.
///
/// Dates are consecutive calendar days; open/high/low bracket the close and
/// volume is constant.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::DailyBar> {
    use crate::domain::DailyBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyBar {
            date: base_date + chrono::Duration::days(i as i64),
            open: close - 0.05,
            high: close + 0.10,
            low: close - 0.10,
            close,
            volume: 1000,
            amount: close * 1000.0 * 100.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
