//! Serializable scan configuration.

use std::path::Path;

use boxscan_core::indicators::MaBreakMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a scan (content-addressable hash).
pub type ScanId = String;

/// Errors from config loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// All parameters of one scan, passed explicitly into the pipeline entry
/// point. No global state: two scans with different configs can run in the
/// same process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Trading date to screen (the "target date").
    pub target_date: NaiveDate,

    /// Trailing-window length for the box computation, in trading days.
    #[serde(default = "default_box_days")]
    pub box_days: usize,

    /// Minimum target-volume / previous-volume ratio (1.5 = +50%).
    #[serde(default = "default_volume_growth_ratio")]
    pub volume_growth_ratio: f64,

    /// Minimum turnover rate, percent.
    #[serde(default = "default_turnover_rate_pct")]
    pub turnover_rate_pct: f64,

    /// Maximum circulating market cap, reporting unit.
    #[serde(default = "default_market_cap_limit")]
    pub market_cap_limit: f64,

    /// Minimum 70% ownership-concentration, percent.
    #[serde(default = "default_concentration_pct")]
    pub concentration_pct: f64,

    /// Moving-average periods that must all be defined at the target date.
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,

    /// Whether the close must stand above all MAs or any one of them.
    #[serde(default = "default_ma_break_mode")]
    pub ma_break_mode: MaBreakMode,

    /// Minimum margin above the box upper edge (0.005 = 0.5%).
    #[serde(default = "default_breakout_margin")]
    pub breakout_margin: f64,
}

fn default_box_days() -> usize {
    20
}
fn default_volume_growth_ratio() -> f64 {
    1.5
}
fn default_turnover_rate_pct() -> f64 {
    10.0
}
fn default_market_cap_limit() -> f64 {
    100.0
}
fn default_concentration_pct() -> f64 {
    70.0
}
fn default_ma_periods() -> Vec<usize> {
    vec![5, 10, 20]
}
fn default_ma_break_mode() -> MaBreakMode {
    MaBreakMode::All
}
fn default_breakout_margin() -> f64 {
    0.005
}

impl ScanConfig {
    /// Default thresholds for a given target date.
    pub fn for_date(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            box_days: default_box_days(),
            volume_growth_ratio: default_volume_growth_ratio(),
            turnover_rate_pct: default_turnover_rate_pct(),
            market_cap_limit: default_market_cap_limit(),
            concentration_pct: default_concentration_pct(),
            ma_periods: default_ma_periods(),
            ma_break_mode: default_ma_break_mode(),
            breakout_margin: default_breakout_margin(),
        }
    }

    /// Load a config from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the pipeline cannot evaluate meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_periods.is_empty() {
            return Err(ConfigError::Invalid("ma_periods must not be empty".into()));
        }
        if self.ma_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::Invalid("ma_periods must all be >= 1".into()));
        }
        if self.box_days == 0 {
            return Err(ConfigError::Invalid("box_days must be >= 1".into()));
        }
        if self.breakout_margin < 0.0 {
            return Err(ConfigError::Invalid(
                "breakout_margin must be non-negative".into(),
            ));
        }
        if self.volume_growth_ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "volume_growth_ratio must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two scans with identical configs share a ScanId, which makes result
    /// artifacts comparable across runs.
    pub fn scan_id(&self) -> ScanId {
        let json = serde_json::to_string(self).expect("ScanConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
