//! Basic-info repository — the instrument profile table.
//!
//! The pipeline only needs four attributes per instrument (code, name,
//! circulating shares, circulating market cap); the trait keeps it agnostic
//! to where they come from. Repository failure is the one fatal error of a
//! run: with no universe there is nothing to scan.

use std::path::PathBuf;

use boxscan_core::domain::InstrumentProfile;
use thiserror::Error;

/// Errors from the profile repository. All of these abort the run.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("instrument profile table not found: {path}")]
    Missing { path: String },
    #[error("failed to read instrument profile table '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse instrument profile table: {0}")]
    Csv(#[from] csv::Error),
}

/// Produces the full list of instrument profiles for the universe.
pub trait BasicInfoRepository {
    fn load_profiles(&self) -> Result<Vec<InstrumentProfile>, RepoError>;
}

/// CSV-backed repository over the headerless stock_basic table.
///
/// Column layout: code, name, circulating shares (10k-share units), total
/// shares, circulating market cap (10k raw units), total market cap,
/// industry, region, list date. Only the first five columns are read; the
/// cap is rescaled by 1/10,000 into the reporting unit.
pub struct CsvBasicInfo {
    path: PathBuf,
}

/// Raw cap values are in 10k units; the reporting unit divides by 10,000.
const CAP_DIVISOR: f64 = 10_000.0;

impl CsvBasicInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BasicInfoRepository for CsvBasicInfo {
    fn load_profiles(&self) -> Result<Vec<InstrumentProfile>, RepoError> {
        if !self.path.is_file() {
            return Err(RepoError::Missing {
                path: self.path.display().to_string(),
            });
        }
        let file = std::fs::File::open(&self.path).map_err(|source| RepoError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut profiles = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(profile) = parse_row(&record) else {
                continue;
            };
            profiles.push(profile);
        }
        Ok(profiles)
    }
}

/// Parse one table row; `None` for rows outside the universe or with
/// malformed numeric fields (tolerated, like a corrupt binary record).
fn parse_row(record: &csv::StringRecord) -> Option<InstrumentProfile> {
    let code = record.get(0)?.trim();
    if !is_universe_code(code) {
        return None;
    }
    let name = record.get(1)?.trim();
    let circulating_shares: f64 = record.get(2)?.trim().parse().ok()?;
    let raw_cap: f64 = record.get(4)?.trim().parse().ok()?;
    Some(InstrumentProfile {
        code: code.to_string(),
        name: name.to_string(),
        circulating_shares,
        circulating_market_cap: raw_cap / CAP_DIVISOR,
    })
}

/// Universe filter: main-board and growth-board code prefixes.
fn is_universe_code(code: &str) -> bool {
    code.starts_with("60") || code.starts_with("00") || code.starts_with("30")
}
