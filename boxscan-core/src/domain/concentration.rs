//! ConcentrationSample — one decoded ownership-concentration record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ownership-concentration sample for one instrument on one trading day.
///
/// `concentration70` is the percentage of shares held within the price band
/// containing 70% of total cost-basis volume. The on-disk field is an f32;
/// it is widened to f64 at decode time. Concentration series are sparse:
/// not every instrument has a file, and not every date in a file is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationSample {
    pub date: NaiveDate,
    pub concentration70: f64,
}
