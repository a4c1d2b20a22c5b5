//! InstrumentProfile — static per-instrument attributes.

use serde::{Deserialize, Serialize};

/// Static attributes for one instrument, loaded once per run from the
/// basic-info repository and read-only thereafter.
///
/// Units follow the source table: `circulating_shares` counts 10,000-share
/// blocks and `circulating_market_cap` is in the reporting unit (the raw
/// table value divided by 10,000).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Exchange-qualified identifier, e.g. "600000.SH".
    pub code: String,
    pub name: String,
    /// Circulating share count in 10,000-share units.
    pub circulating_shares: f64,
    /// Circulating market cap in the reporting unit.
    pub circulating_market_cap: f64,
}
