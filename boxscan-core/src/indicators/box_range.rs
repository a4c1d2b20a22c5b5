//! Trading-range box: trailing-window high of closes and the breakout test.

use chrono::NaiveDate;

use crate::domain::DailyBar;
use crate::indicators::IndicatorError;

/// Outcome of the breakout test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakout {
    pub broke: bool,
    /// `(target_close / box_upper - 1) * 100` when broken, 0.0 otherwise.
    pub ratio_pct: f64,
}

/// Upper edge of the trailing box: max close over the most recent
/// `window_days` bars dated strictly before `target_date`.
///
/// `bars` must be sorted ascending by date. Fails with
/// `InsufficientWindow` when fewer than `window_days` bars qualify.
pub fn box_upper(
    bars: &[DailyBar],
    target_date: NaiveDate,
    window_days: usize,
) -> Result<f64, IndicatorError> {
    let before = bars.partition_point(|b| b.date < target_date);
    if before < window_days {
        return Err(IndicatorError::InsufficientWindow {
            have: before,
            need: window_days,
        });
    }
    let upper = bars[before - window_days..before]
        .iter()
        .map(|b| b.close)
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(upper)
}

/// Breakout test: the target close must clear the box upper edge by more
/// than `margin` (0.005 = 0.5%).
pub fn breakout(target_close: f64, box_upper: f64, margin: f64) -> Breakout {
    let broke = target_close > box_upper * (1.0 + margin);
    Breakout {
        broke,
        ratio_pct: if broke {
            (target_close / box_upper - 1.0) * 100.0
        } else {
            0.0
        },
    }
}
