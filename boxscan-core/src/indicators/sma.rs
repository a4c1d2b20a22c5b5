//! Simple moving average over closes.
//!
//! Rolling mean with a lookback of period - 1: the first period-1 positions
//! are undefined and reported as NaN.

use crate::domain::DailyBar;

/// Moving average of closes for every index of `bars`.
///
/// Index `i` holds the arithmetic mean of closes at `[i-period+1, i]` when
/// `i >= period - 1`, NaN otherwise. Each requested period is computed
/// independently by the caller; an undefined value at the target index
/// excludes the instrument at the completeness stage of the pipeline.
pub fn moving_average(bars: &[DailyBar], period: usize) -> Vec<f64> {
    assert!(period >= 1, "MA period must be >= 1");
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let mut sum: f64 = bars.iter().take(period).map(|b| b.close).sum();
    result[period - 1] = sum / period as f64;

    for i in period..n {
        sum += bars[i].close - bars[i - period].close;
        result[i] = sum / period as f64;
    }

    result
}
