//! DailyBar — one decoded daily price/volume record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument on a single trading day.
///
/// Decoded from a 32-byte fixed record: prices arrive as fixed-point integers
/// (hundredths of a currency unit) and are rescaled at decode time. `volume`
/// is in lots (1 lot = 100 shares). Bars are immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded volume in lots.
    pub volume: u64,
    /// Traded amount in currency units.
    pub amount: f64,
}

impl DailyBar {
    /// Basic OHLC sanity check: high bounds the other prices, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}
